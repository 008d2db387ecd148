use std::path::PathBuf;

/// Member of the debug package that carries the installed file tree.
pub const DATA_ARCHIVE_MEMBER: &str = "data.tar.xz";

/// Naive substring match on both tokens.
///
/// No Debian filename fields are parsed, so a version token that is a prefix
/// of a longer version also matches.
pub fn tokens_match(file_name: &str, architecture: &str, version: &str) -> bool {
    file_name.contains(architecture) && file_name.contains(version)
}

/// Location of the kernel image inside the debug package, relative to the
/// extraction root.
pub fn vmlinux_relative_path(kernel_version: &str) -> PathBuf {
    PathBuf::from(format!("usr/lib/debug/boot/vmlinux-{kernel_version}"))
}
