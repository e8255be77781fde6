use clap::Subcommand;

#[derive(Subcommand)]
pub enum FsCommands {
    /// List files and folders (like ls)
    Ls {
        /// Folder path to list
        #[arg(value_name = "PATH", default_value = "/")]
        path: String,

        /// Requested export mime type for convertible documents
        #[arg(long)]
        export_type: Option<String>,

        /// Filter as FIELD:OP:VALUE (e.g., size:>=:1024)
        #[arg(long, value_name = "FIELD:OP:VALUE")]
        filter: Option<String>,

        /// Sort as FIELD[:asc|desc] (e.g., name:desc)
        #[arg(long, value_name = "FIELD[:DIR]")]
        sort: Option<String>,
    },

    /// Show one file record
    Read {
        /// File path
        #[arg(value_name = "PATH")]
        path: String,

        /// Requested export mime type for convertible documents
        #[arg(long)]
        export_type: Option<String>,
    },

    /// Upload a local file to a new path
    Create {
        /// Local file to upload
        #[arg(value_name = "LOCAL_PATH")]
        local_path: String,

        /// Destination file path
        #[arg(value_name = "REMOTE_PATH")]
        remote_path: String,

        /// Mime type of the content; guessed from the name when omitted
        #[arg(long)]
        mime_type: Option<String>,

        /// Modification time to record (RFC 3339)
        #[arg(long)]
        modified: Option<String>,
    },

    /// Replace content or change metadata of an existing file
    Update {
        /// File path
        #[arg(value_name = "PATH")]
        path: String,

        /// Local file with new content
        #[arg(long, value_name = "LOCAL_PATH")]
        content: Option<String>,

        /// New file name
        #[arg(long)]
        name: Option<String>,

        /// New parent folder path
        #[arg(long = "move-to", value_name = "FOLDER")]
        move_to: Option<String>,

        /// Modification time to record (RFC 3339)
        #[arg(long)]
        modified: Option<String>,
    },

    /// Delete a file, or a folder with --folder
    Rm {
        /// Path to delete
        #[arg(value_name = "PATH")]
        path: String,

        /// Treat the path as a folder
        #[arg(short, long)]
        folder: bool,
    },

    /// Create a folder and any missing parents
    Mkdir {
        /// Folder path to create
        #[arg(value_name = "PATH")]
        path: String,
    },
}
