//! Regex patterns for input parsing and file naming.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // dd.mm.yyyy, day and month may be single digits
    pub static ref DATE_DMY: Regex = Regex::new(
        r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$"
    ).unwrap();

    // Characters not allowed in file names on common filesystems
    pub static ref FILE_NAME_UNSAFE: Regex = Regex::new(
        r#"[\\/:*?"<>|\x00-\x1f]"#
    ).unwrap();
}
