use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kiroku_lot")]
#[command(about = "A tool for recording test scores, comparing and sharing them")]
#[command(version)]
pub struct Cli {
    /// Directory where records are stored
    #[arg(long, global = true, env = "KIROKU_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Base URL used for share and template links
    #[arg(long, global = true, env = "KIROKU_BASE_URL")]
    pub base_url: Option<String>,

    /// Test to operate on for this run only (id, exact name, or unique id prefix)
    #[arg(short, long, global = true)]
    pub test: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all tests
    List,

    /// Show the score board of the selected test
    Show {
        /// Print the test as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Select the test that later commands operate on
    Select {
        /// Test id, exact name, or unique id prefix
        selector: String,
    },

    /// Add a new test and select it
    AddTest {
        /// Test name (defaults to "テスト N")
        name: Option<String>,
    },

    /// Rename the selected test
    RenameTest {
        /// New test name
        name: String,
    },

    /// Delete the selected test
    DeleteTest {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Add a subject to the selected test
    AddSubject {
        /// Subject name
        name: String,

        /// Score (omit for ungraded)
        #[arg(allow_negative_numbers = true)]
        score: Option<f64>,
    },

    /// Set or clear the score of a subject
    SetScore {
        /// Subject name
        name: String,

        /// Score (omit to clear)
        #[arg(allow_negative_numbers = true)]
        score: Option<f64>,
    },

    /// Rename a subject of the selected test
    RenameSubject {
        /// Current subject name
        old_name: String,

        /// New subject name
        new_name: String,
    },

    /// Delete a subject from the selected test
    DeleteSubject {
        /// Subject name
        name: String,
    },

    /// Save the current scores as the previous result
    SavePrevious,

    /// Manage subject templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Print a share link for the selected test
    Share {
        /// Also print a QR image URL for the link
        #[arg(long)]
        qr: bool,
    },

    /// Print an issue tracker URL that publishes the selected test
    Publish,

    /// Compare the selected test with shared data
    Compare {
        /// Share link, transport string, or JSON (reads stdin when omitted)
        text: Option<String>,

        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save shared data as a new test
    SaveShared {
        /// Share link, transport string, or JSON (reads stdin when omitted)
        text: Option<String>,

        /// Name for the new test
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Export all tests as a JSON file
    Export {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Import tests from an exported JSON file
    Import {
        /// Exported JSON file
        file: PathBuf,
    },

    /// Show or set the username attached to shared data
    Username {
        /// New username (empty string clears it)
        name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// List templates
    List,

    /// Save the subjects of the selected test as a template
    Save {
        /// Template name (defaults to "<test>のテンプレート")
        name: Option<String>,
    },

    /// Add the subjects of a template to the selected test
    Apply {
        /// Template id, exact name, or unique id prefix
        selector: String,
    },

    /// Print a share link for a template
    Share {
        /// Template id, exact name, or unique id prefix
        selector: String,

        /// Also print a QR image URL for the link
        #[arg(long)]
        qr: bool,
    },

    /// Load a shared template from a link or pasted text
    Load {
        /// Template link, transport string, or JSON (reads stdin when omitted)
        text: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_subject_with_score() {
        let cli = Cli::try_parse_from(["kiroku_lot", "add-subject", "国語", "80.5"]).unwrap();
        match cli.command {
            Commands::AddSubject { name, score } => {
                assert_eq!(name, "国語");
                assert_eq!(score, Some(80.5));
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_parse_global_test_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["kiroku_lot", "show", "--test", "期末"]).unwrap();
        assert_eq!(cli.test.as_deref(), Some("期末"));
        assert!(matches!(cli.command, Commands::Show { json: false }));
    }

    #[test]
    fn test_parse_template_share() {
        let cli =
            Cli::try_parse_from(["kiroku_lot", "template", "share", "5教科", "--qr"]).unwrap();
        match cli.command {
            Commands::Template {
                action: TemplateAction::Share { selector, qr },
            } => {
                assert_eq!(selector, "5教科");
                assert!(qr);
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_set_score_without_value_clears() {
        let cli = Cli::try_parse_from(["kiroku_lot", "set-score", "数学"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::SetScore { score: None, .. }
        ));
    }
}
