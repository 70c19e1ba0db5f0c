pub mod compile_time {
    pub mod loader {
        /// Maximum snapshot file size accepted by the loader (64MB)
        /// RESOURCE: snapshots are materialized fully in memory
        pub const MAX_SNAPSHOT_FILE_SIZE: u64 = 64 * 1024 * 1024;

        /// Extension used by exported snapshot files
        pub const SNAPSHOT_EXTENSION: &str = "sps";
    }

    pub mod state {
        /// Maximum panel-log entries kept per panel; oldest entries are dropped
        pub const MAX_PANEL_LOG_ENTRIES: usize = 256;
    }

    pub mod grouping {
        /// Maximum number of grouping levels in one grouping configuration
        pub const MAX_GROUPING_DEPTH: usize = 16;

        /// Grouping used when nothing else is configured
        pub const DEFAULT_GROUPING: &str = "benchmark,control,result";
    }

    pub mod logging {
        /// Number of events retained by in-memory loggers
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Messages longer than this are truncated before logging
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 4096;
    }
}
