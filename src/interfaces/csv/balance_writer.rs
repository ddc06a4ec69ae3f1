use crate::domain::profile::Profile;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BalanceRow<'a> {
    id: u32,
    role: &'a str,
    balance: String,
}

/// Writes a balance sheet (`id,role,balance`) as CSV.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_profiles(&mut self, profiles: Vec<Profile>) -> Result<()> {
        for profile in &profiles {
            self.writer.serialize(BalanceRow {
                id: profile.id.0,
                role: if profile.is_client() { "client" } else { "contractor" },
                balance: profile.balance.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
