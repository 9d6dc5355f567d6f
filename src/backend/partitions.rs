/// Key layout for the job record keyspace
///
/// Partition structure:
/// - `jobs`: job:{uuid} -> JobRecord (JSON)
use uuid::Uuid;

pub const JOB_PREFIX: &[u8] = b"job:";

/// Encode a job key: job:{uuid}
pub fn encode_job_key(id: &Uuid) -> Vec<u8> {
    format!("job:{}", id).into_bytes()
}

/// Decode a job key: job:{uuid} -> uuid
pub fn decode_job_key(key: &[u8]) -> Option<Uuid> {
    let key_str = std::str::from_utf8(key).ok()?;
    key_str.strip_prefix("job:")?.parse().ok()
}
