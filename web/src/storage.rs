use julkvall_core::{KeyValueStore, StorageError};
use web_sys::Storage;

/// The browser's local storage.
///
/// Private browsing modes may refuse access, which surfaces as [`StorageError::Unavailable`] on every call.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct BrowserStorage;

impl BrowserStorage {
    fn raw() -> Result<Storage, StorageError> {
        match gloo::utils::window().local_storage() {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(StorageError::Unavailable("no local storage".into())),
            Err(err) => Err(StorageError::Unavailable(format!("{:?}", err))),
        }
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::raw()?
            .get_item(key)
            .map_err(|err| StorageError::Unavailable(format!("{:?}", err)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::raw()?
            .set_item(key, value)
            .map_err(|err| StorageError::Write(format!("{:?}", err)))
    }
}
