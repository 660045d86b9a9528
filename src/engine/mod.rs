pub mod memstore;
pub mod persistence;

pub use memstore::MemStore;
pub use persistence::{Namespace, Persistence};

use std::path::Path;
use std::sync::Arc;
use crate::Result;

/// Opens the file-backed store in `data_dir`, creating the directory if needed.
///
/// # Examples
///
/// ```no_run
/// use daynote_store::{engine, DateKey, NoteReader};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let store = engine::open("./data")?;
///     let today = DateKey::parse("2024-03-05")?;
///     println!("{:?}", store.get(&today).await);
///     Ok(())
/// }
/// ```
pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Arc<MemStore>> {
    let persistence = Arc::new(Persistence::new(data_dir)?);
    let initial_data = persistence.load()?;
    Ok(Arc::new(MemStore::new(initial_data, Some(persistence))))
}
