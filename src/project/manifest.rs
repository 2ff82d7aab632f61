use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::compiler::{program::RoutineKind, Sequencer};
use crate::config::MemoryLayout;

/// Summary of a compiled sequencer, written next to the listing for the
/// plotting and analysis tools, which need names and addresses without
/// parsing the source again.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Manifest {
    pub source: PathBuf,
    pub clock_period_ps: u64,
    pub clocks: Vec<ClockEntry>,
    pub functions: Vec<FunctionEntry>,
    pub routines: Vec<RoutineEntry>,
    pub pointers: Vec<PointerEntry>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ClockEntry {
    pub name: String,
    pub bit: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct FunctionEntry {
    pub id: u8,
    pub name: String,
    pub description: String,
    pub clocks: Vec<String>,
    /// In clock cycles.
    pub total_time: u64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct RoutineEntry {
    pub name: String,
    pub kind: RoutineKind,
    pub address: u16,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PointerEntry {
    pub kind: String,
    pub name: String,
    pub address: u32,
    pub value: Option<u32>,
}

impl Manifest {
    pub fn extract(seq: &Sequencer, layout: &MemoryLayout) -> Manifest {
        let clocks = seq
            .clocks()
            .iter()
            .map(|(bit, name)| ClockEntry {
                name: name.into(),
                bit,
            })
            .collect();

        let functions = seq
            .functions()
            .iter()
            .map(|f| FunctionEntry {
                id: f.id(),
                name: f.name().into(),
                description: f.description().into(),
                clocks: f.clocks().to_vec(),
                total_time: f.total_time(),
            })
            .collect();

        let routines = seq
            .program()
            .routines()
            .iter()
            .map(|r| RoutineEntry {
                name: r.name.clone(),
                kind: r.kind,
                address: r.address,
            })
            .collect();

        let pointers = seq
            .pointers()
            .iter()
            .map(|p| PointerEntry {
                kind: p.kind().keyword().into(),
                name: p.name().into(),
                address: p.address(layout),
                value: p.value(),
            })
            .collect();

        Manifest {
            source: seq.source().to_path_buf(),
            clock_period_ps: seq.clock_period_ps() as u64,
            clocks,
            functions,
            routines,
            pointers,
        }
    }

    pub fn get_function(&self, name: &str) -> Option<&FunctionEntry> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Loads a manifest from the given reader.
    pub fn read<R: std::io::Read>(reader: R) -> Result<Manifest, serde_yaml::Error> {
        let manifest: Manifest = serde_yaml::from_reader(reader)?;
        Ok(manifest)
    }

    /// Writes the Manifest to the given writer
    pub fn write<W: std::io::Write>(&self, writer: W) -> Result<(), serde_yaml::Error> {
        serde_yaml::to_writer(writer, self)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::compiler::{compile, import::MemoryLoader, SourceMap};
    use crate::config::CompilerConfig;

    const READOUT: &str = "\
[constants]
clockperiod: 10 ns
[clocks]
RG: 0
TRG: 5
[pointers]
REP_SUBR  Lines  3
[functions]
ReadPixel:   # one pixel
  clocks: RG, TRG
  slices:
    100 ns = 1, 0
    200 ns = 0, 1
[subroutines]
ReadLine:
  CALL ReadPixel repeat(10)
  RTS
[mains]
Acq:
  JSR ReadLine repeat(@Lines)
  END
";

    fn manifest() -> Manifest {
        let mut loader = MemoryLoader::new();
        loader.add("readout.seq", READOUT);
        let seq = compile(
            Path::new("readout.seq"),
            &loader,
            &CompilerConfig::default(),
            &mut SourceMap::new(),
        )
        .unwrap();
        Manifest::extract(&seq, &MemoryLayout::default())
    }

    #[test]
    fn extract_from_sequencer() {
        let manifest = manifest();

        assert_eq!(manifest.source, PathBuf::from("readout.seq"));
        assert_eq!(manifest.clock_period_ps, 10_000);
        assert_eq!(
            manifest.clocks,
            vec![
                ClockEntry {
                    name: "RG".into(),
                    bit: 0
                },
                ClockEntry {
                    name: "TRG".into(),
                    bit: 5
                },
            ]
        );

        let f = manifest.get_function("ReadPixel").unwrap();
        assert_eq!(f.id, 1);
        assert_eq!(f.description, "one pixel");
        assert_eq!(f.clocks, vec!["RG".to_string(), "TRG".to_string()]);
        assert_eq!(f.total_time, 30);
        assert!(manifest.get_function("Clear").is_none());

        assert_eq!(
            manifest.routines,
            vec![
                RoutineEntry {
                    name: "Acq".into(),
                    kind: RoutineKind::Main,
                    address: 0
                },
                RoutineEntry {
                    name: "ReadLine".into(),
                    kind: RoutineKind::Subroutine,
                    address: 8
                },
            ]
        );

        assert_eq!(manifest.pointers.len(), 2);
        assert_eq!(
            manifest.pointers[0],
            PointerEntry {
                kind: "REP_SUBR".into(),
                name: "Lines".into(),
                address: 0x38_0000,
                value: Some(3)
            }
        );
        assert_eq!(manifest.pointers[1].kind, "MAIN");
        assert_eq!(manifest.pointers[1].value, Some(0));
    }

    #[test]
    fn yaml_round_trip() {
        let manifest = manifest();
        let mut buf = vec![];
        manifest.write(&mut buf).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.contains("kind: subroutine"));

        let read = Manifest::read(buf.as_slice()).unwrap();
        assert_eq!(read, manifest);
    }
}
