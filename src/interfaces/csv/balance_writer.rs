use crate::domain::{Profile, Role};
use crate::error::Result;
use std::io::Write;

/// Writes final committed balances as CSV: `profile,role,balance`.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_profiles(&mut self, mut profiles: Vec<Profile>) -> Result<()> {
        profiles.sort_by_key(|p| p.id);
        self.writer.write_record(["profile", "role", "balance"])?;
        for profile in profiles {
            let role = match profile.role {
                Role::Client => "client",
                Role::Contractor => "contractor",
            };
            self.writer.write_record([
                profile.id.to_string(),
                role.to_string(),
                profile.balance.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
