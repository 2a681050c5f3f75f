use crate::config::ConfigOverrides;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "liveroom",
    about = "Terminal client for live classrooms and roster assignment",
    long_about = "liveroom talks to a learning-management backend: join a live class as a student, or assign students to batches and batches to assessments as a teacher.",
    version
)]
pub struct Cli {
    /// Base URL of the REST backend
    #[arg(long, global = true, env = "LIVEROOM_API_URL")]
    pub api_url: Option<String>,

    /// Base URL of the live classroom socket server
    #[arg(long, global = true, env = "LIVEROOM_WS_URL")]
    pub ws_url: Option<String>,

    /// Where the session file is kept (default: ~/.liveroom)
    #[arg(long, global = true, env = "LIVEROOM_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long, env = "LIVEROOM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user and their home view
    Whoami {
        /// Re-fetch the profile from the backend
        #[arg(long)]
        refresh: bool,
    },
    /// Join a live classroom as a student
    Live {
        #[arg(long)]
        room: String,
    },
    /// Choose which students belong to a batch
    AssignStudents {
        #[arg(long)]
        batch: String,
    },
    /// Choose which batches an assessment is assigned to
    AssignBatches {
        #[arg(long)]
        assessment: String,
    },
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            ws_url: self.ws_url.clone(),
            data_dir: self.data_dir.clone(),
        }
    }
}
