//! Credential storage and the 401 side-effect surface.
//!
//! The client never mints tokens; an external authentication subsystem owns login/logout
//! and writes the bearer secret into a [`TokenStore`]. This module only reads that secret
//! for header injection and clears it when the server answers 401, after which the
//! [`UnauthorizedHandler`] fires exactly once per rejected request.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
	sync::atomic::{AtomicU32, Ordering},
};
// self
use crate::_prelude::*;

/// Redacted bearer secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Persistent credential storage contract.
///
/// Reads vastly outnumber writes: the facade reads the secret once per attempt, while
/// writes only happen at login (external) and on a 401 ([`TokenStore::clear`]). Storage
/// keeps two keyed slots because deployments that migrated token formats still carry a
/// legacy key that must also be wiped on credential rejection.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns the bearer secret currently stored under the active key, if any.
	fn bearer(&self) -> Option<TokenSecret>;

	/// Replaces the secret stored under the active key.
	fn store(&self, secret: TokenSecret);

	/// Clears both the active and the legacy key.
	fn clear(&self);
}

/// In-process [`TokenStore`] for tests, demos, and embedded use.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
	current: RwLock<Option<TokenSecret>>,
	legacy: RwLock<Option<TokenSecret>>,
}
impl MemoryTokenStore {
	/// Creates a store pre-seeded with an active bearer secret.
	pub fn with_bearer(secret: TokenSecret) -> Self {
		let store = Self::default();

		store.store(secret);

		store
	}

	/// Writes a secret under the legacy key (migration leftovers).
	pub fn store_legacy(&self, secret: TokenSecret) {
		*self.legacy.write() = Some(secret);
	}

	/// Returns the secret stored under the legacy key, if any.
	pub fn legacy(&self) -> Option<TokenSecret> {
		self.legacy.read().clone()
	}

	/// True when neither key holds a secret.
	pub fn is_empty(&self) -> bool {
		self.current.read().is_none() && self.legacy.read().is_none()
	}
}
impl TokenStore for MemoryTokenStore {
	fn bearer(&self) -> Option<TokenSecret> {
		self.current.read().clone()
	}

	fn store(&self, secret: TokenSecret) {
		*self.current.write() = Some(secret);
	}

	fn clear(&self) {
		*self.current.write() = None;
		*self.legacy.write() = None;
	}
}

/// Error type produced by persistent [`TokenStore`] backends.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Serialization failure surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct TokenSnapshot {
	current: Option<TokenSecret>,
	legacy: Option<TokenSecret>,
}

/// File-backed [`TokenStore`] persisting a JSON snapshot after each mutation.
///
/// Mutations through the [`TokenStore`] trait are infallible by contract (a failed
/// disk write must not abort the 401 handling path), so persistence failures are
/// reported through the `tracing` feature and otherwise dropped.
#[derive(Debug)]
pub struct FileTokenStore {
	path: PathBuf,
	inner: RwLock<TokenSnapshot>,
}
impl FileTokenStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot =
			if path.exists() { Self::load_snapshot(&path)? } else { TokenSnapshot::default() };

		Ok(Self { path, inner: RwLock::new(snapshot) })
	}

	fn load_snapshot(path: &Path) -> Result<TokenSnapshot, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(TokenSnapshot::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, snapshot: &TokenSnapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize token snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn persist_best_effort(&self, snapshot: &TokenSnapshot) {
		if let Err(error) = self.persist_locked(snapshot) {
			#[cfg(feature = "tracing")]
			tracing::warn!(%error, "Token snapshot could not be persisted.");
			#[cfg(not(feature = "tracing"))]
			let _ = error;
		}
	}

	/// Writes a secret under the legacy key (migration leftovers).
	pub fn store_legacy(&self, secret: TokenSecret) {
		let mut guard = self.inner.write();

		guard.legacy = Some(secret);
		self.persist_best_effort(&guard);
	}
}
impl TokenStore for FileTokenStore {
	fn bearer(&self) -> Option<TokenSecret> {
		self.inner.read().current.clone()
	}

	fn store(&self, secret: TokenSecret) {
		let mut guard = self.inner.write();

		guard.current = Some(secret);
		self.persist_best_effort(&guard);
	}

	fn clear(&self) {
		let mut guard = self.inner.write();

		guard.current = None;
		guard.legacy = None;
		self.persist_best_effort(&guard);
	}
}

/// Side-effect hook fired after a 401 has cleared the stored credential.
pub trait UnauthorizedHandler
where
	Self: Send + Sync,
{
	/// Invoked once per rejected request, after [`TokenStore::clear`] has run.
	fn on_unauthorized(&self);
}

/// Handler that swallows 401 notifications; useful for batch tools without a UI surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopUnauthorizedHandler;
impl UnauthorizedHandler for NoopUnauthorizedHandler {
	fn on_unauthorized(&self) {}
}

/// Route-tracking [`UnauthorizedHandler`] that navigates to a login route at most once.
///
/// Navigation is skipped when the tracked location already is the login route, which
/// prevents the redirect loop the original application guarded against.
#[derive(Debug)]
pub struct LoginRedirect {
	login_route: String,
	location: Mutex<String>,
	navigations: AtomicU32,
}
impl LoginRedirect {
	/// Creates a redirect handler targeting `login_route`, starting at `current`.
	pub fn new(login_route: impl Into<String>, current: impl Into<String>) -> Self {
		Self {
			login_route: login_route.into(),
			location: Mutex::new(current.into()),
			navigations: AtomicU32::new(0),
		}
	}

	/// Returns the currently tracked location.
	pub fn location(&self) -> String {
		self.location.lock().clone()
	}

	/// Returns how many navigations have been performed.
	pub fn navigations(&self) -> u32 {
		self.navigations.load(Ordering::Relaxed)
	}
}
impl UnauthorizedHandler for LoginRedirect {
	fn on_unauthorized(&self) {
		let mut location = self.location.lock();

		if *location != self.login_route {
			*location = self.login_route.clone();
			self.navigations.fetch_add(1, Ordering::Relaxed);
		}
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn memory_store_clear_wipes_both_keys() {
		let store = MemoryTokenStore::with_bearer(TokenSecret::new("bearer"));

		store.store_legacy(TokenSecret::new("legacy"));
		assert!(store.bearer().is_some());
		assert!(store.legacy().is_some());

		store.clear();

		assert!(store.is_empty());
	}

	#[test]
	fn login_redirect_navigates_once() {
		let redirect = LoginRedirect::new("/login", "/efactura/facturi");

		redirect.on_unauthorized();
		redirect.on_unauthorized();

		assert_eq!(redirect.location(), "/login");
		assert_eq!(redirect.navigations(), 1);
	}

	#[test]
	fn login_redirect_is_noop_on_login_route() {
		let redirect = LoginRedirect::new("/login", "/login");

		redirect.on_unauthorized();

		assert_eq!(redirect.navigations(), 0);
	}

	fn temp_path() -> PathBuf {
		let unique = format!(
			"spv_client_token_store_{}_{}.json",
			process::id(),
			std::time::SystemTime::now()
				.duration_since(std::time::UNIX_EPOCH)
				.map(|d| d.as_nanos())
				.unwrap_or_default(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn file_store_round_trips_and_clears() {
		let path = temp_path();
		let store = FileTokenStore::open(&path).expect("Failed to open token store snapshot.");

		store.store(TokenSecret::new("persisted-bearer"));
		store.store_legacy(TokenSecret::new("persisted-legacy"));
		drop(store);

		let reopened =
			FileTokenStore::open(&path).expect("Failed to reopen token store snapshot.");

		assert_eq!(
			reopened.bearer().map(|secret| secret.expose().to_owned()),
			Some("persisted-bearer".to_owned()),
		);

		reopened.clear();
		drop(reopened);

		let cleared =
			FileTokenStore::open(&path).expect("Failed to reopen cleared token store snapshot.");

		assert!(cleared.bearer().is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary token snapshot {}: {e}", path.display())
		});
	}
}
