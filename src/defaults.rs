//! Built-in ignore rules.
//!
//! Applied as default-role exclude patterns unless default ignores are
//! disabled. Hidden paths are additionally caught by an implicit rule in
//! the classifier, so the VCS and editor entries here mostly serve as
//! attribution in log events.

pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Hidden items
    ".*",
    "**/.DS_Store",
    "**/Thumbs.db",
    "**/.classpath",
    "**/.project",
    "**/.settings/",
    "**/.idea/",
    "**/.vscode/",
    // Version control
    "**/.git/",
    "**/.svn/",
    "**/.hg/",
    "**/.bzr/",
    // Build output and caches
    "**/__pycache__/",
    "**/build/",
    "**/dist/",
    "**/target/",
    "**/out/",
    "**/bin/",
    "**/*.egg-info/",
    "**/.cache/",
    "**/.pytest_cache/",
    "**/.mypy_cache/",
    "**/.ruff_cache/",
    // Dependencies
    "**/node_modules/",
    "**/bower_components/",
    "**/vendor/",
    // Virtual environments
    "**/.venv/",
    "**/venv/",
    "**/ENV/",
    "**/env/",
    "**/.env/",
    // Logs
    "**/*.log",
    "**/*.logs",
    // Temporary and backup files
    "**/*.tmp",
    "**/*.temp",
    "**/*.bak",
    "**/*.swp",
    "**/*~",
    // Compiled code and binaries
    "**/*.pyc",
    "**/*.pyo",
    "**/*.pyd",
    "**/*.class",
    "**/*.jar",
    "**/*.war",
    "**/*.ear",
    "**/*.o",
    "**/*.obj",
    "**/*.so",
    "**/*.dylib",
    "**/*.dll",
    "**/*.lib",
    "**/*.a",
    "**/*.exe",
    "**/*.com",
    "**/*.bat",
    "**/*.sh",
    // Media, archives, documents, databases
    "*.jpg",
    "*.jpeg",
    "*.png",
    "*.gif",
    "*.bmp",
    "*.tiff",
    "*.webp",
    "*.mp4",
    "*.avi",
    "*.mov",
    "*.mkv",
    "*.wmv",
    "*.mp3",
    "*.wav",
    "*.flac",
    "*.aac",
    "*.ogg",
    "*.zip",
    "*.tar",
    "*.tar.gz",
    "*.tar.bz2",
    "*.rar",
    "*.7z",
    "*.gz",
    "*.bz2",
    "*.woff",
    "*.woff2",
    "*.ttf",
    "*.otf",
    "*.eot",
    "*.pdf",
    "*.doc",
    "*.docx",
    "*.ppt",
    "*.pptx",
    "*.xls",
    "*.xlsx",
    "*.odt",
    "*.ods",
    "*.odp",
    "*.iso",
    "*.img",
    "*.dmg",
    "*.app",
    "*.msi",
    "*.db",
    "*.sqlite",
    "*.sqlite3",
    "*.mdb",
    // Secrets and lock files
    "**/.env",
    "**/.env.*",
    "**/uv.lock",
    "**/poetry.lock",
    "**/Pipfile.lock",
    "**/yarn.lock",
    "**/package-lock.json",
    "**/composer.lock",
    "**/Gemfile.lock",
    "**/MANIFEST.MF",
];
