//! Export of roster universes as CSV.

use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::roster::{Roster, ROSTER_SIZE};

/// Column headings of an exported universe.
pub const UNIVERSE_HEADER: [&str; ROSTER_SIZE + 4] = [
    "driver_1",
    "driver_2",
    "driver_3",
    "driver_4",
    "driver_5",
    "team",
    "talent_driver",
    "cost",
    "points",
];

pub struct CsvWriter<W: Write> {
    writer: W,
}
impl CsvWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}
impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn append<R>(&mut self, record: R) -> Result<(), io::Error>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut first = true;
        for datum in record {
            if first {
                first = false;
            } else {
                self.writer.write_all(b",")?;
            }
            write_field(&mut self.writer, datum.as_ref())?;
        }
        self.writer.write_all(b"\n")
    }

    pub fn flush(&mut self) -> Result<(), io::Error> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Writes a field, quoting it if it contains a delimiter, a quote or a line break.
fn write_field(writer: &mut impl Write, field: &str) -> Result<(), io::Error> {
    if field.contains([',', '"', '\n', '\r']) {
        write!(writer, "\"{}\"", field.replace('"', "\"\""))
    } else {
        writer.write_all(field.as_bytes())
    }
}

pub fn roster_record(roster: &Roster) -> Vec<String> {
    let mut record = Vec::with_capacity(UNIVERSE_HEADER.len());
    record.extend(roster.entrants.iter().map(|entrant| entrant.name.clone()));
    record.push(roster.team.name.clone());
    record.push(roster.talent.name.clone());
    record.push(roster.cost.to_string());
    record.push(roster.points.to_string());
    record
}

/// Writes `rosters` under a header row, one roster per line.
pub fn write_universe<W: Write>(
    writer: &mut CsvWriter<W>,
    rosters: &[Roster],
) -> Result<(), io::Error> {
    writer.append(UNIVERSE_HEADER)?;
    for roster in rosters {
        writer.append(roster_record(roster))?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Snapshot;

    #[test]
    fn universe() {
        let pool: Vec<_> = (1..=5)
            .map(|index| Snapshot::new(format!("d{index}"), 10.0, 20.0))
            .collect();
        let team = Snapshot::new("Red, Inc.", 7.5, 12.5);
        let entrants = [&pool[0], &pool[1], &pool[2], &pool[3], &pool[4]];
        let roster = Roster::new(0, entrants, &team, &pool[2], 2.0);

        let mut writer = CsvWriter::new(vec![]);
        write_universe(&mut writer, &[roster]).unwrap();
        let written = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            "driver_1,driver_2,driver_3,driver_4,driver_5,team,talent_driver,cost,points\n\
             d1,d2,d3,d4,d5,\"Red, Inc.\",d3,57.5,132.5\n",
            written
        );
    }
}
