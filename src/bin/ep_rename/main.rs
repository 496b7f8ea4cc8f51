use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use ep_rename::materialize::OutputType;
use ep_rename::overlap::OverlapPolicy;
use ep_rename::pattern::DEFAULT_INPUT_FORMAT;
use ep_rename::transform::ZeroPad;
use ep_rename::{EpRename, EpRenameConfig, RenameOptions};

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Canonicalize episode file names using symbolic links",
    after_help = "Example: with files like 'fullmetal_alchemist_brotherhood_-_01_[1080p_bd-rip].mkv',\n\
                  running `eprename -t \"Fullmetal Alchemist Brotherhood\"` creates links named\n\
                  'Fullmetal Alchemist Brotherhood 01.mkv' and so on in the same directory."
)]
struct Args {
    /// Optional input directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// The title to begin each file name with
    #[arg(short, long, required_unless_present = "completion")]
    title: Option<String>,

    /// Directory where the links are created, defaults to the input directory
    #[arg(short, long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    destination: Option<PathBuf>,

    /// Use the s1e1 s1e2 pattern with the given season
    #[arg(short, long, value_name = "N")]
    season: Option<String>,

    /// Number files in order instead of using the extracted episode number
    #[arg(long, overrides_with = "no_renumber")]
    renumber: bool,

    /// Keep extracted episode numbers even if another option implies renumbering
    #[arg(long, overrides_with = "renumber")]
    no_renumber: bool,

    /// Start renumbering from N instead of 1
    #[arg(long, value_name = "N")]
    renumber_start: Option<u64>,

    /// Remove the season and number episodes continuously across seasons (implies --renumber)
    #[arg(long)]
    strip_season: bool,

    /// Change season and episode numbers like 01 to 1
    #[arg(long)]
    strip_leading_zeros: bool,

    /// Left pad episode numbers to WIDTH (`--zero-pad=WIDTH`), or to the longest number if WIDTH is not given
    #[arg(
        long,
        value_name = "WIDTH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "auto"
    )]
    zero_pad: Option<ZeroPad>,

    /// Overwrite destination files that already exist
    #[arg(long)]
    overwrite: bool,

    /// How to choose between source files that map to the same destination
    #[arg(long, value_enum, value_name = "METHOD", default_value_t = OverlapPolicy::Error)]
    resolve_overlaps: OverlapPolicy,

    /// What to create at the destination
    #[arg(short, long, value_enum, value_name = "TYPE", default_value_t = OutputType::Symlink)]
    output_type: OutputType,

    /// Only act on the first N files in sorted order
    #[arg(long, value_name = "N")]
    first: Option<usize>,

    /// Skip the first N files in sorted order (implies --renumber)
    #[arg(long, value_name = "N")]
    skip: Option<usize>,

    /// Only print changes without creating files
    #[arg(long)]
    dry: bool,

    /// Input file name format
    #[arg(short, long = "input-fmt", value_name = "FORMAT", default_value = DEFAULT_INPUT_FORMAT)]
    input_format: String,

    /// Generate shell completion
    #[arg(short = 'l', long, value_name = "SHELL")]
    completion: Option<Shell>,

    /// Print created files, use -vv for more details
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Convert parsed arguments to unvalidated rename options.
    fn into_options(self) -> RenameOptions {
        let renumber = if self.renumber {
            Some(true)
        } else if self.no_renumber {
            Some(false)
        } else {
            None
        };
        RenameOptions {
            path: self.path,
            title: self.title.unwrap_or_default(),
            destination: self.destination,
            season: self.season,
            renumber,
            renumber_start: self.renumber_start,
            strip_season: self.strip_season,
            strip_leading_zeros: self.strip_leading_zeros,
            zero_pad: self.zero_pad,
            overwrite: self.overwrite,
            resolve_overlaps: self.resolve_overlaps,
            output_type: self.output_type,
            first: self.first,
            skip: self.skip,
            dry: self.dry,
            input_format: self.input_format,
            verbose: self.verbose,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        return ep_rename::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"));
    }
    let config = match EpRenameConfig::from_options(args.into_options()) {
        Ok(config) => config,
        Err(error) => Args::command().error(ErrorKind::ArgumentConflict, error).exit(),
    };
    EpRename::new(config).run()
}
