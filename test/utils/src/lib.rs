use std::env;
use std::path::PathBuf;

/// Unique scratch directory under the system temp dir. Callers are expected
/// to clean up after themselves.
pub fn scratch_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|e| return e.as_nanos())
        .unwrap_or_default();

    return env::temp_dir().join(format!("toolgate-{name}-{}-{nanos}", std::process::id()));
}

pub fn article_response_fixture() -> &'static str {
    return r#"
{
  "posts": [
    "AI is reshaping diagnostics, from radiology to pathology.",
    "Hospitals use machine learning to predict patient readmissions."
  ]
}
"#
    .trim();
}

pub fn company_names_fixture() -> &'static str {
    return r#"
{
  "data": {
    "data": {
      "data": {
        "companyNames": ["Brightleaf", "Northwind Labs", "Quillo"]
      }
    }
  }
}
"#
    .trim();
}

/// First bytes of a GIF89a file, enough to stand in for a real payload.
pub fn gif_fixture() -> Vec<u8> {
    return vec![
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0xff, 0xff,
        0xff, 0x00, 0x00, 0x00, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
        0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
    ];
}
