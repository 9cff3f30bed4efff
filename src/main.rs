// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `p7m-inspect`: print who signed a CMS / PKCS#7 envelope.

use {
    anyhow::{Context, Result},
    clap::{Arg, ArgMatches, Command},
    cms_envelope_inspector::{
        inspect_envelope, try_inspect_envelope, SignatureRecord, MAX_ENVELOPE_DEPTH,
    },
    chrono::{DateTime, Utc},
    std::path::Path,
};

fn format_instant(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn print_record(record: &SignatureRecord) {
    println!(
        "  signature {} (envelope level {})",
        record.signer_index, record.envelope_level
    );

    if let Some(error) = &record.error {
        println!("    error:      {}", error);
    } else {
        println!("    signer:     {}", record.signer_name);
        if !record.signer_identifier.is_empty() {
            println!("    identifier: {}", record.signer_identifier);
        }
        if let Some(not_after) = record.not_after {
            println!("    expires:    {}", format_instant(not_after));
        }
        println!("    issued by:  {}", record.issuer);
    }

    if let Some(signing_time) = record.signing_time {
        println!("    signed at:  {}", format_instant(signing_time));
    }
}

fn inspect_file(path: &Path, strict: bool, max_depth: usize) -> Result<()> {
    let data =
        std::fs::read(path).with_context(|| format!("unable to read {}", path.display()))?;

    let records = if strict {
        try_inspect_envelope(&data, max_depth)
            .with_context(|| format!("unable to inspect {}", path.display()))?
    } else {
        inspect_envelope(&data)
    };

    println!("{}: {} signature(s)", path.display(), records.len());
    for record in &records {
        print_record(record);
    }

    Ok(())
}

fn run(args: &ArgMatches) -> Result<()> {
    let strict = args.is_present("strict");

    let max_depth = match args.value_of("max_depth") {
        Some(value) => value
            .parse::<usize>()
            .context("--max-depth requires an integer")?,
        None => MAX_ENVELOPE_DEPTH,
    };

    for path in args.values_of("path").expect("path is required") {
        inspect_file(Path::new(path), strict, max_depth)?;
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let matches = Command::new("p7m-inspect")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Report signer metadata from CMS / PKCS#7 signed envelopes (.p7m)")
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail on undecodable input instead of reporting zero signatures"),
        )
        .arg(
            Arg::new("max_depth")
                .long("max-depth")
                .takes_value(true)
                .value_name("N")
                .help("Maximum envelope nesting depth to descend into"),
        )
        .arg(
            Arg::new("path")
                .value_name("PATH")
                .required(true)
                .multiple_values(true)
                .help("Signed envelope files to inspect"),
        )
        .get_matches();

    let exit_code = match run(&matches) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {:#}", err);
            1
        }
    };

    std::process::exit(exit_code);
}
