pub mod bucket;
pub mod replay;
pub mod source;

pub use bucket::{validate_key, BucketTransfer, LocalBucket, BUCKET_DIR_ENV};
pub use replay::ReplaySource;
pub use source::TransferSource;
