use std::{error::Error, path::PathBuf};

use clap::Parser;
use syzygy_platform::{Context, SearchPath, TableKind};

/// Locates Syzygy table files and checks their headers.
#[derive(Debug, Parser)]
struct Opt {
    /// Tablebase directories. Defaults to SYZYGY_PATH.
    #[arg(long = "path")]
    path: Vec<PathBuf>,
    /// Lists all tables found in the search path
    #[arg(long = "list")]
    list: bool,
    /// Material configurations, like KQvK
    names: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let opt = Opt::parse();

    let ctx = if opt.path.is_empty() {
        Context::from_env()
    } else {
        Context::with_search_path(opt.path.into_iter().collect::<SearchPath>())
    };

    if opt.list {
        let inventory = ctx.inventory();
        let mut tables: Vec<_> = inventory.iter().collect();
        tables.sort_by_key(|&(stem, _)| (stem.len(), stem));
        for (stem, entry) in tables {
            println!("{stem}\t{:?}", entry.kinds());
        }
        println!("{} tables, up to {} pieces", inventory.len(), inventory.largest());
    }

    for name in &opt.names {
        for kind in TableKind::ALL {
            match ctx.open_table(name, kind) {
                Ok(table) => println!(
                    "{name}{}\t{}\t{} bytes",
                    kind.suffix(),
                    table.path().display(),
                    table.bytes().len()
                ),
                Err(err) => println!("{name}{}\t{err}", kind.suffix()),
            }
        }
    }

    Ok(())
}
