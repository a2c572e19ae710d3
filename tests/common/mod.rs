#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use landkreis_stats::{data::Value, frame::Frame};
use tempfile::{TempDir, tempdir};

pub const VEHICLE_EXPORT: &str = "\
statistics_code;time;1_variable_attribute_code;1_variable_attribute_label;2_variable_attribute_code;3_variable_attribute_code;value
46251-0021;2020-01-01;01001;Flensburg, Kreisfreie Stadt;KS-BENZIN;PKW-EURO6R;120
46251-0021;2020-01-01;01001;Flensburg, Kreisfreie Stadt;KS-DIESEL;PKW-EURO4;30
46251-0021;2020-01-01;01001;Flensburg, Kreisfreie Stadt;KS-ELEKTRO;PKW-EURO6;10
46251-0021;2020-01-01;01001;Flensburg, Kreisfreie Stadt;;;160
46251-0021;2020-01-01;03241;Region Hannover;KS-BENZIN;PKW-EURO6;500
46251-0021;2020-01-01;03241;Region Hannover;KS-PIH;PKW-EURO6DT;40
46251-0021;2020-01-01;05334;Aachen, Kreis (bis 20.10.2009);KS-BENZIN;PKW-EURO4;99
46251-0021;2020-01-01;081170;Göppingen;KS-SONST;PKW-SONST;7
";

pub const POPULATION_EXPORT: &str = "\
Statistik_Code;Zeit;1_Auspraegung_Code;1_Auspraegung_Label;2_Auspraegung_Code;2_Auspraegung_Label;3_Auspraegung_Code;3_Auspraegung_Label;BEVMZ11__Bevoelkerung_am_Hauptwohnort__1000
12211-Z-03;2020;01001;Flensburg;;;;;89,5
12211-Z-03;2020;01001;Flensburg;ALT000B15;unter 15 Jahre;;;12,1
12211-Z-03;2020;01001;Flensburg;;;GESM;männlich;44,0
12211-Z-03;2020;03241;Region Hannover;;;;;1157,6
12211-Z-03;2020;08117;Göppingen;;;;;257,2
";

pub const INCOME_EXPORT: &str = "\
Statistik_Code;1_Auspraegung_Code;1_Auspraegung_Label;ID0002__Verfuegbares_Einkommen_je_EW__EUR
AI-S-01;01001;Flensburg;19876
AI-S-01;03241;Region Hannover;24012,5
AI-S-01;08117;Göppingen;25500
";

pub const ACCIDENT_EXPORT: &str = "\
Statistik_Code;1_Auspraegung_Code;1_Auspraegung_Label;AI1303__Strassenverkehrsunfaelle_je_10.000_Kfz__Anzahl
AI013-3;01001;Flensburg;310,2
AI013-3;03241;Region Hannover;-
AI013-3;08117;Göppingen;188,4
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes UTF-8 `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    /// Writes `contents` encoded as ISO-8859-1, the encoding of most GENESIS exports.
    pub fn write_latin1(&self, name: &str, contents: &str) -> PathBuf {
        let (encoded, _, had_errors) = WINDOWS_1252.encode(contents);
        assert!(!had_errors, "fixture not representable in latin-1");
        self.write_bytes(name, &encoded)
    }

    fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture directory");
        }
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }

    /// Lays out `raw/` with the four sample exports and returns the data directory.
    pub fn seed_raw_data(&self) -> PathBuf {
        self.write("data/raw/46251-0021_de_2020_flat.csv", VEHICLE_EXPORT);
        self.write_latin1("data/raw/12211-Z-03_flat.csv", POPULATION_EXPORT);
        self.write_latin1("data/raw/AI-S-01_flat.csv", INCOME_EXPORT);
        self.write_latin1("data/raw/AI013-3_flat.csv", ACCIDENT_EXPORT);
        self.path().join("data")
    }
}

pub fn text(value: &str) -> Option<Value> {
    Some(Value::String(value.to_string()))
}

pub fn frame(headers: &[&str], rows: Vec<Vec<Option<Value>>>) -> Frame {
    Frame::from_rows(headers.iter().map(|h| h.to_string()).collect(), rows).expect("frame")
}

/// Reads a CSV written by the pipeline into header and row strings.
pub fn read_output(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("open output");
    let headers = reader
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|record| {
            record
                .expect("record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    (headers, rows)
}
