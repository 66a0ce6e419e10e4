// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, KEYS, Settings};
use crate::utils::{pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", _)) => {
            let s = Settings::load(conn)?;
            let mut rows = Vec::new();
            for key in KEYS {
                rows.push(vec![key.to_string(), s.value_of(key)?]);
            }
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        Some(("get", sub)) => {
            let key = required(sub, "key")?.trim();
            println!("{}", Settings::load(conn)?.value_of(key)?);
        }
        Some(("set", sub)) => {
            let key = required(sub, "key")?.trim();
            let value = config::set(conn, key, required(sub, "value")?)?;
            println!("{} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
