//! Loading a dataset file from disk.

use anyhow::Context;
use flate2::read::GzDecoder;
use log::info;
use sta_core::{reading::cities, Reading};
use std::{fs, io::Read, path::Path};

/// Read a readings CSV, decompressing it first when the name ends in `.gz`.
pub fn load_readings(path: &str) -> anyhow::Result<Vec<Reading>> {
    let raw = fs::read(path).with_context(|| format!("Failed to read {}", path))?;
    let is_gzip = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    let body = if is_gzip {
        let mut body = String::new();
        GzDecoder::new(raw.as_slice())
            .read_to_string(&mut body)
            .with_context(|| format!("Failed to decompress {}", path))?;
        body
    } else {
        String::from_utf8(raw).with_context(|| format!("{} is not valid UTF-8", path))?
    };
    info!("Read {} bytes of CSV from {}", body.len(), path);
    let readings =
        Reading::parse_csv(&body).with_context(|| format!("Failed to parse readings from {}", path))?;
    Ok(readings)
}

/// Fail with the list of known cities when `city` has no readings.
pub fn ensure_city(readings: &[Reading], city: &str) -> anyhow::Result<()> {
    if readings.iter().any(|r| r.city == city) {
        return Ok(());
    }
    anyhow::bail!(
        "No readings for city {:?}. Available cities: {}",
        city,
        cities(readings).join(", ")
    )
}

/// Run the `cities` command.
pub fn run_cities(csv: &str) -> anyhow::Result<()> {
    let readings = load_readings(csv)?;
    for city in cities(&readings) {
        println!("{}", city);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    const CSV: &str = "city,timestamp,season,temperature\nRome,2012-08-01,summer,30.5\nRome,2012-08-02,summer,31.5\n";

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sta-cmd-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_load_plain_csv() {
        let path = temp_path("plain.csv");
        fs::write(&path, CSV).unwrap();
        let readings = load_readings(path.to_str().unwrap()).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].temperature, 31.5);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_gzip_csv() {
        let path = temp_path("data.csv.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(CSV.as_bytes()).unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();
        let readings = load_readings(path.to_str().unwrap()).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].city, "Rome");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_ensure_city() {
        let readings = Reading::parse_csv(CSV).unwrap();
        assert!(ensure_city(&readings, "Rome").is_ok());
        let err = ensure_city(&readings, "Milan").unwrap_err();
        assert_eq!(err.to_string(), "No readings for city \"Milan\". Available cities: Rome");
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_readings("/nonexistent/readings.csv").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/readings.csv"));
    }
}
