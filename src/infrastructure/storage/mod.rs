mod local_staging_store;

pub use local_staging_store::LocalStagingStore;
