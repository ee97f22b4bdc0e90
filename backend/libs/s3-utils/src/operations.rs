/// S3 object operations
use aws_sdk_s3::primitives::ByteStream;

use crate::{S3Client, S3Error};

impl S3Client {
    /// Upload an object and return the URL it is publicly served from
    pub async fn upload_file(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, S3Error> {
        let size = body.len();
        self.client()
            .put_object()
            .bucket(&self.config().bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::Request(format!("put_object {}: {}", key, e)))?;

        tracing::debug!(key = %key, size, "Object uploaded");

        Ok(self.config().public_url(key))
    }

    /// Delete an object
    pub async fn delete_file(&self, key: &str) -> Result<(), S3Error> {
        self.client()
            .delete_object()
            .bucket(&self.config().bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| S3Error::Request(format!("delete_object {}: {}", key, e)))?;

        Ok(())
    }
}
