//! Command Line Interface helpers for msinventory

use std::{
    ffi::OsString,
    fmt::{Debug, Display},
};

use clap::{
    arg, command,
    ErrorKind::{DisplayHelp, DisplayVersion},
    ValueHint::DirPath,
};
use log::{debug, info, trace};

use crate::{
    dataset::ExclusionSet,
    error::{InventoryError, InventoryError::DryRun},
    inventory::{InventoryContext, InventoryContextBuilder, DEFAULT_ROOT},
    report::ReportPaths,
};

/// Args for an inventory run.
pub struct CliContext {
    /// What to inventory and where to write it
    pub inventory_ctx: InventoryContext,
}

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

/// Write a few lines describing how this executable was compiled.
///
/// # Errors
///
/// propagates writeln! fails
pub fn fmt_build_info(f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match GIT_HEAD_REF {
        Some(hr) => {
            let dirty = GIT_DIRTY.unwrap_or(false);
            writeln!(
                f,
                "Compiled on git commit hash: {}{}",
                GIT_COMMIT_HASH.unwrap_or("<unknown>"),
                if dirty { " (dirty)" } else { "" }
            )?;
            writeln!(f, "            git head ref: {}", hr)?;
        }
        None => writeln!(f, "Compiled on git commit hash: <no git info>")?,
    }
    writeln!(f, "            {}", BUILT_TIME_UTC)?;
    writeln!(f, "         with compiler {}", RUSTC_VERSION)?;
    writeln!(f)?;
    Ok(())
}

impl Display for CliContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} version {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        )?;
        fmt_build_info(f)?;
        write!(f, "{}", self.inventory_ctx)
    }
}

impl CliContext {
    fn get_matches<I, T>(args: I) -> Result<clap::ArgMatches, InventoryError>
    where
        I: IntoIterator<Item = T> + Debug,
        T: Into<OsString> + Clone,
    {
        let mut app = command!()
            .next_line_help(false)
            .about(
                "Inventory the CASA measurement sets in a test data tree, writing \
                    observation listings and an HTML summary per subdirectory.",
            )
            .args(&[
                // input options
                arg!([ROOT] "Directory whose subdirectories hold the measurement sets")
                    .default_value(DEFAULT_ROOT)
                    .value_hint(DirPath)
                    .help_heading("INPUT"),
                arg!(--subdir <NAME> "Only process the subdirectory <NAME>; may be repeated")
                    .multiple_occurrences(true)
                    .required(false)
                    .help_heading("INPUT"),
                arg!(--exclude <NAME> "Never list or read datasets named <NAME>; may be repeated")
                    .multiple_occurrences(true)
                    .required(false)
                    .help_heading("INPUT"),
                arg!(--"no-default-excludes" "Don't exclude the datasets known to crash casacore")
                    .help_heading("INPUT"),
                // output options
                arg!(-o --outdir <DIR> "Directory for listings, reports and archives")
                    .default_value(".")
                    .required(false)
                    .value_hint(DirPath)
                    .help_heading("OUTPUT"),
                arg!(--"dry-run" "Just print the summary and exit"),
                arg!(--"no-draw-progress" "do not show progress bars"),
            ]);
        let matches = app.try_get_matches_from_mut(args)?;
        Ok(matches)
    }

    fn parse_exclusions(matches: &clap::ArgMatches) -> ExclusionSet {
        let mut exclusions = if matches.is_present("no-default-excludes") {
            ExclusionSet::default()
        } else {
            ExclusionSet::casatestdata()
        };
        if let Some(names) = matches.values_of("exclude") {
            exclusions.extend(names);
        }
        exclusions
    }

    /// Parse an iterator of arguments, `args` into a `CliContext`.
    ///
    /// # Errors
    ///
    /// Can raise:
    /// - [`InventoryError::ClapError`] if clap cannot parse `args`, or for
    ///   `--help` and `--version`
    /// - [`InventoryError::DryRun`] after logging the summary, if `--dry-run`
    pub fn from_args<I, T>(args: I) -> Result<Self, InventoryError>
    where
        I: IntoIterator<Item = T> + Debug,
        T: Into<OsString> + Clone,
    {
        debug!("args:\n{:?}", &args);

        let matches = Self::get_matches(args)?;
        trace!("arg matches:\n{:?}", &matches);

        let mut builder = InventoryContextBuilder::default();
        if let Some(root) = matches.value_of("ROOT") {
            builder.root(root.into());
        }
        if let Some(out_dir) = matches.value_of("outdir") {
            builder.out_dir(out_dir.into());
        }
        let inventory_ctx = builder
            .exclusions(Self::parse_exclusions(&matches))
            .subdir_names(
                matches
                    .values_of("subdir")
                    .map(|names| names.map(String::from).collect()),
            )
            .draw_progress(!matches.is_present("no-draw-progress"))
            .build()?;

        let result = Self { inventory_ctx };

        info!("{}", &result);

        if matches.is_present("dry-run") {
            return Err(DryRun {});
        }

        Ok(result)
    }

    /// List, summarise and archive every selected subdirectory.
    ///
    /// # Errors
    ///
    /// see [`InventoryContext::run`]
    pub fn run(self) -> Result<Vec<ReportPaths>, InventoryError> {
        let reports = self.inventory_ctx.run()?;
        for paths in &reports {
            info!(
                "Wrote {} and {}",
                paths.html.display(),
                paths.archive.display()
            );
        }
        Ok(reports)
    }
}

/// Parse `args` and run, returning the process exit code.
pub fn main_with_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T> + Debug,
    T: Into<OsString> + Clone,
{
    let cli_ctx = match CliContext::from_args(args) {
        Ok(cli_ctx) => cli_ctx,
        Err(DryRun {}) => {
            info!("Dry run. No files will be written.");
            return 0;
        }
        Err(InventoryError::ClapError(inner)) => {
            // Swallow broken pipe errors
            trace!("clap error: {:?}", inner.kind());
            let _ = inner.print();
            match inner.kind() {
                DisplayHelp | DisplayVersion => return 0,
                _ => return 1,
            }
        }
        Err(e) => {
            eprintln!("error parsing args: {e}");
            return 1;
        }
    };

    match cli_ctx.run() {
        Ok(reports) => {
            info!("{} reports written", reports.len());
            0
        }
        Err(e) => {
            eprintln!("inventory error: {e}");
            1
        }
    }
}
