use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use super::{CvStorage, StorageError, UploadedCv};
use crate::config::S3Config;

/// Stores CVs in an S3-compatible bucket (AWS or MinIO).
/// The returned address is `<public_url>/<bucket>/<key>`.
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_url: String) -> Self {
        Self {
            client,
            bucket,
            public_url,
        }
    }

    /// Constructs an S3 client configured for MinIO (local) or AWS (production).
    pub async fn from_config(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "intake-static",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        // Path-style addressing so MinIO endpoints resolve without bucket DNS.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        info!("S3 storage initialized (bucket: {})", config.bucket);
        Self::new(
            aws_sdk_s3::Client::from_conf(s3_config),
            config.bucket.clone(),
            config.public_url.clone(),
        )
    }

    fn public_address(&self, key: &str) -> String {
        public_address(&self.public_url, &self.bucket, key)
    }
}

fn public_address(public_url: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", public_url.trim_end_matches('/'), bucket, key)
}

#[async_trait]
impl CvStorage for S3Storage {
    async fn put(&self, key: &str, cv: &UploadedCv) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(cv.bytes.clone()))
            .content_type(cv.content_type())
            .send()
            .await
            .map_err(|e| StorageError::Remote(format!("{e}")))?;

        info!("Uploaded CV to s3://{}/{}", self.bucket, key);
        Ok(self.public_address(key))
    }

    fn backend(&self) -> &'static str {
        "s3"
    }
}
