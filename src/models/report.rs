use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire names of every report field, in their canonical casing.
const REPORT_FIELDS: [&str; 6] = [
    "Cluster",
    "Successful",
    "BackupSizeMeasurement",
    "CreationTimeMeasurement",
    "EncryptionTimeMeasurement",
    "UploadTimeMeasurement",
];

/// The outcome of a single etcd backup run, as measured by the backup job.
///
/// Field names on the wire follow the reporting protocol (`Successful`,
/// `BackupSizeMeasurement`, ...). Fields missing from a payload decode to
/// their zero value and unknown fields are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MeasurementBundle {
    #[serde(rename = "Successful")]
    pub successful: bool,
    /// Size of the uploaded backup file, as seen by the object store.
    #[serde(rename = "BackupSizeMeasurement", alias = "BackupSizeBytes")]
    pub backup_size_bytes: i64,
    #[serde(rename = "CreationTimeMeasurement")]
    pub creation_time_ms: i64,
    #[serde(rename = "EncryptionTimeMeasurement")]
    pub encryption_time_ms: i64,
    #[serde(rename = "UploadTimeMeasurement")]
    pub upload_time_ms: i64,
}

impl MeasurementBundle {
    /// A bundle describing a successful backup.
    pub fn success(
        backup_size_bytes: i64,
        creation_time_ms: i64,
        encryption_time_ms: i64,
        upload_time_ms: i64,
    ) -> Self {
        MeasurementBundle {
            successful: true,
            backup_size_bytes,
            creation_time_ms,
            encryption_time_ms,
            upload_time_ms,
        }
    }

    /// A bundle describing a failed backup. Measurements are left at zero.
    pub fn failure() -> Self {
        MeasurementBundle::default()
    }
}

/// A backup report as received from (or forwarded to) a collector: the
/// measurements plus the tenant cluster they belong to, in one flat object.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupReport {
    #[serde(rename = "Cluster", default)]
    pub cluster: String,
    #[serde(flatten)]
    pub bundle: MeasurementBundle,
}

impl BackupReport {
    pub fn new(cluster: impl Into<String>, bundle: MeasurementBundle) -> Self {
        BackupReport {
            cluster: cluster.into(),
            bundle,
        }
    }

    /// Decodes a report from a request body the way backup jobs expect it
    /// to be read.
    ///
    /// Only the first JSON value is read and anything after it is ignored.
    /// Field names match case-insensitively, the last occurrence of a field
    /// wins and `null` values leave a field untouched. A bare `null` body is
    /// an empty report.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let raw = serde_json::Deserializer::from_slice(body)
            .into_iter::<RawReport>()
            .next()
            .unwrap_or_else(|| Err(de::Error::custom("empty report body")))?;

        let Some(fields) = raw.0 else {
            return Ok(BackupReport::default());
        };

        let mut object = Map::new();
        for (key, value) in fields {
            if value.is_null() {
                continue;
            }
            let key = canonical_key(&key).map_or(key, str::to_string);
            object.insert(key, value);
        }
        serde_json::from_value(Value::Object(object))
    }
}

fn canonical_key(key: &str) -> Option<&'static str> {
    if key.eq_ignore_ascii_case("BackupSizeBytes") {
        return Some("BackupSizeMeasurement");
    }
    REPORT_FIELDS
        .iter()
        .copied()
        .find(|field| field.eq_ignore_ascii_case(key))
}

/// A top-level report object with its keys in document order, or `None`
/// for a JSON `null`.
struct RawReport(Option<Vec<(String, Value)>>);

impl<'de> Deserialize<'de> for RawReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawReportVisitor;

        impl<'de> Visitor<'de> for RawReportVisitor {
            type Value = RawReport;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object or null")
            }

            fn visit_unit<E: de::Error>(self) -> Result<RawReport, E> {
                Ok(RawReport(None))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawReport, A::Error> {
                let mut fields = Vec::new();
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    fields.push(entry);
                }
                Ok(RawReport(Some(fields)))
            }
        }

        deserializer.deserialize_any(RawReportVisitor)
    }
}
