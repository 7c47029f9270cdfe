// Transport Port
// One channel per invocation: parent writes, child reads + overwrites,
// parent reads, channel is disposed.

use std::ffi::OsString;
use std::io;

use crate::error::Result;

/// A single-use communication channel between parent and child
pub trait TaskChannel: Send {
    /// Argument handed to the child so it can find this channel
    fn locator(&self) -> OsString;

    /// Replace the channel content
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Read the full channel content
    fn read_bytes(&self) -> io::Result<Vec<u8>>;

    /// Remove the channel. Implementations must also clean up on drop, so
    /// early returns never leak a channel.
    fn dispose(self) -> io::Result<()>
    where
        Self: Sized;
}

/// Factory for task channels
pub trait Transport: Send + Sync {
    type Channel: TaskChannel;

    /// Create a fresh, uniquely named channel
    fn open(&self) -> Result<Self::Channel>;
}

// ============================================================================
// In-memory transport for tests
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::port::id_provider::{IdProvider, UuidProvider};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Store = Arc<Mutex<HashMap<String, Vec<u8>>>>;

    /// In-memory transport. Locators look like `mem://<id>`.
    #[derive(Clone)]
    pub struct MemoryTransport {
        store: Store,
        id_provider: Arc<dyn IdProvider>,
    }

    impl Default for MemoryTransport {
        fn default() -> Self {
            Self::new(Arc::new(UuidProvider))
        }
    }

    impl MemoryTransport {
        pub fn new(id_provider: Arc<dyn IdProvider>) -> Self {
            Self {
                store: Arc::new(Mutex::new(HashMap::new())),
                id_provider,
            }
        }

        /// Read a channel by locator, as a child would
        pub fn read_raw(&self, locator: &str) -> Option<Vec<u8>> {
            self.store.lock().unwrap().get(locator).cloned()
        }

        /// Overwrite a channel by locator, as a child would.
        /// Returns false if no such channel is open.
        pub fn write_raw(&self, locator: &str, bytes: Vec<u8>) -> bool {
            match self.store.lock().unwrap().get_mut(locator) {
                Some(slot) => {
                    *slot = bytes;
                    true
                }
                None => false,
            }
        }

        pub fn open_channels(&self) -> usize {
            self.store.lock().unwrap().len()
        }
    }

    impl Transport for MemoryTransport {
        type Channel = MemoryChannel;

        fn open(&self) -> Result<MemoryChannel> {
            let key = format!("mem://{}", self.id_provider.generate_id());
            self.store.lock().unwrap().insert(key.clone(), Vec::new());
            Ok(MemoryChannel {
                store: self.store.clone(),
                key,
            })
        }
    }

    /// Channel handed out by MemoryTransport
    pub struct MemoryChannel {
        store: Store,
        key: String,
    }

    impl TaskChannel for MemoryChannel {
        fn locator(&self) -> OsString {
            OsString::from(&self.key)
        }

        fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
            let mut store = self.store.lock().unwrap();
            match store.get_mut(&self.key) {
                Some(slot) => {
                    *slot = bytes.to_vec();
                    Ok(())
                }
                None => Err(io::Error::new(io::ErrorKind::NotFound, self.key.clone())),
            }
        }

        fn read_bytes(&self) -> io::Result<Vec<u8>> {
            self.store
                .lock()
                .unwrap()
                .get(&self.key)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, self.key.clone()))
        }

        fn dispose(self) -> io::Result<()> {
            // Drop removes the entry
            Ok(())
        }
    }

    impl Drop for MemoryChannel {
        fn drop(&mut self) {
            if let Ok(mut store) = self.store.lock() {
                store.remove(&self.key);
            }
        }
    }
}
