//! Conversion settings and command-line parsing.
//!
//! [`ConvertConfig`] carries everything a conversion run needs. The `convert`
//! binary builds it from its arguments with [`ConvertConfig::from_args`] and
//! checks the paths with [`ConvertConfig::validate`] before opening anything.

use crate::error::{MarcError, Result};
use crate::formats::Format;
use crate::reader::LexOptions;
use crate::xslt::SAXON_JAR;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Usage text printed by `convert --help`.
pub const HELP_TEXT: &str = r#"
Convert a file of MARC (.lex) records to MARC XML.

Synopsis:

convert -i INPUT_PATH -o OUTPUT_PATH [OPTIONS]

Parameters:

    -i, --ifile <path>
        Input file; must be a MARC .lex file.

    -o, --ofile <path>
        Output file; a .xml file.

Options:

    -x, --xfile <path>
        Apply this XSLT stylesheet to each record. The XSLT processor
        saxon.jar must sit in the same folder as the stylesheet unless
        --saxon is given. Transformed records are written one after
        another without a wrapping root element.

    --saxon <path>
        Path to the Saxon jar.

    -d, --delimiter <char>
        Recognise only this subfield delimiter. By default both the
        0x1F control character and '$' introduce a subfield.

    --debug
        Log every record.

    --help
        Display this help message and exit.
"#;

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Run a conversion.
    Run(ConvertConfig),
    /// Print the usage text.
    Help,
}

/// Settings for one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertConfig {
    /// MARC .lex input file.
    pub input: PathBuf,
    /// MARC XML output file.
    pub output: PathBuf,
    /// Optional XSLT stylesheet applied per record.
    pub stylesheet: Option<PathBuf>,
    /// Explicit Saxon jar; defaults to `saxon.jar` beside the stylesheet.
    pub saxon_jar: Option<PathBuf>,
    /// Verbose logging.
    pub debug: bool,
    /// Parser settings.
    pub lex: LexOptions,
}

impl ConvertConfig {
    /// Parse command-line arguments (without the program name).
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::Usage`] for unknown options, missing values, or
    /// a missing input or output path.
    pub fn from_args<S: AsRef<OsStr>>(args: &[S]) -> Result<CliCommand> {
        let mut opts = getopts::Options::new();
        opts.optopt("i", "ifile", "MARC .lex input file", "INPUT_PATH");
        opts.optopt("o", "ofile", "MARC XML output file", "OUTPUT_PATH");
        opts.optopt("x", "xfile", "XSLT stylesheet", "XSLT_PATH");
        opts.optopt("", "saxon", "Saxon jar", "JAR");
        opts.optopt("d", "delimiter", "Subfield delimiter", "CHAR");
        opts.optflag("", "debug", "Debug mode");
        opts.optflag("h", "help", "Display help");

        let params = opts
            .parse(args)
            .map_err(|e| MarcError::Usage(e.to_string()))?;

        if params.opt_present("help") {
            return Ok(CliCommand::Help);
        }
        if !params.free.is_empty() {
            return Err(MarcError::Usage(format!(
                "Unexpected argument: {}",
                params.free[0]
            )));
        }

        let input = params
            .opt_str("ifile")
            .ok_or_else(|| MarcError::Usage("No input file has been specified".to_string()))?;
        let output = params
            .opt_str("ofile")
            .ok_or_else(|| MarcError::Usage("No output file has been specified".to_string()))?;

        let lex = match params.opt_str("delimiter") {
            Some(value) => LexOptions::with_delimiter(parse_delimiter(&value)?),
            None => LexOptions::default(),
        };

        Ok(CliCommand::Run(ConvertConfig {
            input: PathBuf::from(input),
            output: PathBuf::from(output),
            stylesheet: params.opt_str("xfile").map(PathBuf::from),
            saxon_jar: params.opt_str("saxon").map(PathBuf::from),
            debug: params.opt_present("debug"),
            lex,
        }))
    }

    /// The Saxon jar to run when a stylesheet is configured.
    #[must_use]
    pub fn saxon_jar_path(&self) -> Option<PathBuf> {
        if let Some(jar) = &self.saxon_jar {
            return Some(jar.clone());
        }
        self.stylesheet.as_ref().map(|xsl| {
            xsl.parent()
                .unwrap_or_else(|| Path::new(""))
                .join(SAXON_JAR)
        })
    }

    /// Check every configured path.
    ///
    /// - input: `.lex` extension, existing file
    /// - output: `.xml` extension when one is given, existing parent directory
    /// - stylesheet: `.xsl` extension when one is given, existing file
    /// - Saxon jar: existing file when a stylesheet is configured
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::Path`] for the first path that fails.
    pub fn validate(&self) -> Result<()> {
        check_extension("input", &self.input, Format::Lex, true)?;
        check_file_exists("input", &self.input)?;

        check_extension("output", &self.output, Format::MarcXml, false)?;
        if self.output.as_os_str().is_empty() {
            return Err(MarcError::path("output", &self.output, "empty path"));
        }
        if let Some(parent) = self.output.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(MarcError::path(
                    "output",
                    &self.output,
                    format!("directory {} does not exist", parent.display()),
                ));
            }
        }

        if let Some(stylesheet) = &self.stylesheet {
            check_extension("xslt", stylesheet, Format::Xslt, false)?;
            check_file_exists("xslt", stylesheet)?;
        }
        if let Some(jar) = self.saxon_jar_path() {
            check_file_exists("xslt processor", &jar)?;
        }
        Ok(())
    }
}

fn parse_delimiter(value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(MarcError::Usage(format!(
            "Delimiter must be a single character: {value:?}"
        ))),
    }
}

/// Reject a path whose extension is not `format`'s. A missing extension is
/// only an error when `required` is set.
fn check_extension(role: &'static str, path: &Path, format: Format, required: bool) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if Format::from_extension(ext) == Some(format) => Ok(()),
        None if !required => Ok(()),
        _ => Err(MarcError::path(
            role,
            path,
            format!(
                "the {role} file should be a {format} file (.{})",
                format.extension()
            ),
        )),
    }
}

fn check_file_exists(role: &'static str, path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(MarcError::path(
            role,
            path,
            format!("the specified {role} file cannot be found"),
        ))
    }
}
