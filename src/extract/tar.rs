use std::fs::OpenOptions;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::HipoError;

use super::apply_mode;
use super::guard::{contained_parent, guard_entry};

/// Stream a gzip-compressed tarball into `root`, one entry at a time.
pub fn extract_tar_gz<R: Read>(reader: R, root: &Path) -> Result<(), HipoError> {
    let root = root.canonicalize()?;
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    let entries = archive.entries().map_err(archive_error)?;

    for entry in entries {
        let mut entry = entry.map_err(archive_error)?;
        let name = entry.path().map_err(archive_error)?.to_string_lossy().into_owned();
        let lexical = guard_entry(&root, &name)?;

        let header = entry.header();
        let kind = header.entry_type();
        let mode = header.mode().map_err(archive_error)?;

        if kind.is_pax_global_extensions() {
            continue;
        }

        let out_path = resolved_path(&root, &lexical)?;

        if kind.is_dir() {
            tracing::debug!("mkdir {} ({:o})", out_path.display(), mode & 0o7777);
            create_dir_with_mode(&out_path, mode)?;
            continue;
        }

        if kind.is_symlink() || kind.is_hard_link() {
            let target = entry
                .link_name()
                .map_err(archive_error)?
                .ok_or_else(|| HipoError::ArchiveFormat(format!("{name}: link without target")))?
                .into_owned();
            if kind.is_symlink() {
                link(&root, &out_path, &target)?;
            } else {
                hard_link(&root, &out_path, &target)?;
            }
            continue;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        let mut out_file = options.open(&out_path)?;
        std::io::copy(&mut entry, &mut out_file).map_err(HipoError::from_archive_io)?;
        drop(out_file);

        apply_mode(&out_path, mode)?;
        tracing::debug!("wrote {} ({:o})", out_path.display(), mode & 0o7777);
    }

    Ok(())
}

// Errors surfaced by the decoder or the header parser.
fn archive_error(err: std::io::Error) -> HipoError {
    HipoError::ArchiveFormat(err.to_string())
}

// Where the entry really lands once links from earlier entries are followed.
// A link already sitting at the final component is replaced, never written through.
fn resolved_path(root: &Path, lexical: &Path) -> Result<PathBuf, HipoError> {
    let parent = contained_parent(root, lexical)?;
    let file_name = lexical
        .file_name()
        .ok_or_else(|| HipoError::ArchiveFormat(format!("{}: no file name", lexical.display())))?;
    let out_path = parent.join(file_name);

    if out_path
        .symlink_metadata()
        .is_ok_and(|meta| meta.file_type().is_symlink())
    {
        std::fs::remove_file(&out_path)?;
    }
    Ok(out_path)
}

fn create_dir_with_mode(path: &Path, mode: u32) -> Result<(), HipoError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        std::fs::DirBuilder::new()
            .recursive(true)
            .mode(mode & 0o7777)
            .create(path)?;
    }
    #[cfg(not(unix))]
    {
        std::fs::create_dir_all(path)?;
    }

    apply_mode(path, mode)
}

#[cfg(unix)]
fn link(root: &Path, out_path: &Path, target: &Path) -> Result<(), HipoError> {
    super::guard::guard_link_target(root, out_path, target)?;
    if out_path.symlink_metadata().is_ok() {
        std::fs::remove_file(out_path)?;
    }
    std::os::unix::fs::symlink(target, out_path)?;
    tracing::debug!("linked {} -> {}", out_path.display(), target.display());
    Ok(())
}

#[cfg(not(unix))]
fn link(_root: &Path, out_path: &Path, _target: &Path) -> Result<(), HipoError> {
    tracing::debug!("skipping symlink {}", out_path.display());
    Ok(())
}

// Hard link targets name an earlier entry, relative to the archive root.
fn hard_link(root: &Path, out_path: &Path, target: &Path) -> Result<(), HipoError> {
    let lexical = guard_entry(root, &target.to_string_lossy())?;
    let source = contained_parent(root, &lexical)?.join(lexical.file_name().unwrap_or_default());
    if out_path.symlink_metadata().is_ok() {
        std::fs::remove_file(out_path)?;
    }
    std::fs::hard_link(&source, out_path)?;
    tracing::debug!("hard linked {} -> {}", out_path.display(), source.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tar::{EntryType, Header};
    use tempfile::tempdir;

    struct Fixture<'a> {
        name: &'a str,
        kind: EntryType,
        data: &'a [u8],
        mode: u32,
        link: Option<&'a str>,
    }

    fn file<'a>(name: &'a str, data: &'a [u8], mode: u32) -> Fixture<'a> {
        Fixture { name, kind: EntryType::Regular, data, mode, link: None }
    }

    fn dir(name: &str, mode: u32) -> Fixture<'_> {
        Fixture { name, kind: EntryType::Directory, data: b"", mode, link: None }
    }

    fn symlink<'a>(name: &'a str, target: &'a str) -> Fixture<'a> {
        Fixture { name, kind: EntryType::Symlink, data: b"", mode: 0o777, link: Some(target) }
    }

    // Writes names verbatim so tests can produce entries tar::Builder refuses.
    fn raw_header(fixture: &Fixture<'_>) -> Header {
        let mut header = Header::new_gnu();
        let name = fixture.name.as_bytes();
        header.as_old_mut().name[..name.len()].copy_from_slice(name);
        if let Some(target) = fixture.link {
            let target = target.as_bytes();
            header.as_old_mut().linkname[..target.len()].copy_from_slice(target);
        }
        header.set_entry_type(fixture.kind);
        header.set_size(fixture.data.len() as u64);
        header.set_mode(fixture.mode);
        header.set_cksum();
        header
    }

    fn build_tar_gz(fixtures: &[Fixture<'_>]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for fixture in fixtures {
            builder.append(&raw_header(fixture), fixture.data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let payloads: Vec<(&str, Vec<u8>)> = vec![
            ("jdk-21/release", b"JAVA_VERSION=\"21.0.2\"\n".to_vec()),
            ("jdk-21/bin/java", vec![0x7f, b'E', b'L', b'F', 0, 1, 2, 3]),
            ("jdk-21/lib/modules", (0..70_000u32).map(|i| (i % 251) as u8).collect()),
            ("jdk-21/lib/empty.cfg", Vec::new()),
        ];
        let mut fixtures = vec![dir("jdk-21/", 0o755)];
        fixtures.extend(payloads.iter().map(|(name, data)| file(name, data, 0o644)));
        let bytes = build_tar_gz(&fixtures);

        let root = tempdir().unwrap();
        extract_tar_gz(bytes.as_slice(), root.path()).unwrap();

        for (name, data) in &payloads {
            assert_eq!(&std::fs::read(root.path().join(name)).unwrap(), data, "{name}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn applies_header_modes() {
        use std::os::unix::fs::PermissionsExt;

        let bytes = build_tar_gz(&[
            dir("jdk-21/", 0o755),
            dir("jdk-21/conf/", 0o700),
            file("jdk-21/bin/java", b"elf", 0o755),
            file("jdk-21/conf/net.properties", b"x", 0o600),
            file("jdk-21/lib/jvm.cfg", b"-server KNOWN", 0o644),
        ]);
        let root = tempdir().unwrap();
        extract_tar_gz(bytes.as_slice(), root.path()).unwrap();

        let mode = |p: &str| {
            std::fs::metadata(root.path().join(p)).unwrap().permissions().mode() & 0o777
        };
        assert_eq!(mode("jdk-21/conf"), 0o700);
        assert_eq!(mode("jdk-21/bin/java"), 0o755);
        assert_eq!(mode("jdk-21/conf/net.properties"), 0o600);
        assert_eq!(mode("jdk-21/lib/jvm.cfg"), 0o644);
    }

    #[test]
    fn parent_traversal_is_rejected() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("jre");
        std::fs::create_dir(&root).unwrap();

        let bytes = build_tar_gz(&[
            file("jdk-21/ok", b"ok", 0o644),
            file("../escaped", b"pwned", 0o644),
        ]);

        let err = extract_tar_gz(bytes.as_slice(), &root).unwrap_err();
        assert!(matches!(err, HipoError::PathTraversal { .. }), "{err:?}");
        assert!(!outer.path().join("escaped").exists());
        assert!(root.join("jdk-21/ok").exists());
    }

    #[test]
    fn absolute_entry_is_rejected() {
        let outer = tempdir().unwrap();
        let absolute = outer.path().join("abs-target");
        let name = absolute.to_string_lossy().into_owned();
        let root = outer.path().join("jre");
        std::fs::create_dir(&root).unwrap();

        let bytes = build_tar_gz(&[file(&name, b"pwned", 0o644)]);

        let err = extract_tar_gz(bytes.as_slice(), &root).unwrap_err();
        assert!(matches!(err, HipoError::PathTraversal { .. }), "{err:?}");
        assert!(!absolute.exists());
    }

    #[test]
    fn dot_entry_resolving_to_root_is_rejected() {
        let root = tempdir().unwrap();
        let bytes = build_tar_gz(&[dir("./", 0o755)]);

        let err = extract_tar_gz(bytes.as_slice(), root.path()).unwrap_err();
        assert!(matches!(err, HipoError::PathTraversal { .. }), "{err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_inside_root_are_recreated() {
        let bytes = build_tar_gz(&[
            file("jdk-21/legal/java.base/LICENSE", b"GPLv2+CPE", 0o644),
            Fixture {
                name: "jdk-21/legal/java.xml/LICENSE",
                kind: EntryType::Symlink,
                data: b"",
                mode: 0o777,
                link: Some("../java.base/LICENSE"),
            },
        ]);
        let root = tempdir().unwrap();
        extract_tar_gz(bytes.as_slice(), root.path()).unwrap();

        let linked = root.path().join("jdk-21/legal/java.xml/LICENSE");
        assert!(linked.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read(&linked).unwrap(), b"GPLv2+CPE");
    }

    #[cfg(unix)]
    #[test]
    fn escaping_symlinks_are_rejected() {
        let bytes = build_tar_gz(&[Fixture {
            name: "jdk-21/lib/evil",
            kind: EntryType::Symlink,
            data: b"",
            mode: 0o777,
            link: Some("../../../../../../etc/passwd"),
        }]);
        let root = tempdir().unwrap();

        let err = extract_tar_gz(bytes.as_slice(), root.path()).unwrap_err();
        assert!(matches!(err, HipoError::PathTraversal { .. }), "{err:?}");
        assert!(root.path().join("jdk-21/lib/evil").symlink_metadata().is_err());
    }

    #[test]
    fn corrupt_gzip_is_format_error() {
        let mut bytes = build_tar_gz(&[file("jdk-21/bin/java", b"elf", 0o755)]);
        bytes[0] = 0x00;
        let root = tempdir().unwrap();

        let err = extract_tar_gz(bytes.as_slice(), root.path()).unwrap_err();
        assert!(matches!(err, HipoError::ArchiveFormat(_)), "{err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn chained_links_cannot_carry_writes_outside() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("jre");
        std::fs::create_dir(&root).unwrap();

        let bytes = build_tar_gz(&[
            symlink("a", "."),
            symlink("a/b", ".."),
            file("a/b/pwned", b"pwned", 0o644),
        ]);

        let err = extract_tar_gz(bytes.as_slice(), &root).unwrap_err();
        assert!(matches!(err, HipoError::PathTraversal { .. }), "{err:?}");
        assert!(!outer.path().join("pwned").exists());
        assert!(root.join("b").symlink_metadata().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn writes_through_an_inner_directory_link_stay_inside() {
        let bytes = build_tar_gz(&[
            dir("jdk-21/", 0o755),
            symlink("current", "jdk-21"),
            file("current/release", b"JAVA_VERSION=21", 0o644),
        ]);
        let root = tempdir().unwrap();
        extract_tar_gz(bytes.as_slice(), root.path()).unwrap();

        assert_eq!(std::fs::read(root.path().join("jdk-21/release")).unwrap(), b"JAVA_VERSION=21");
        assert!(root.path().join("current").symlink_metadata().unwrap().file_type().is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn file_entry_replaces_a_link_instead_of_following_it() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("jre");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("victim"), b"untouched").unwrap();
        std::os::unix::fs::symlink("../victim", root.join("release")).unwrap();

        let bytes = build_tar_gz(&[file("release", b"JAVA_VERSION=21", 0o644)]);
        extract_tar_gz(bytes.as_slice(), &root).unwrap();

        assert_eq!(std::fs::read(outer.path().join("victim")).unwrap(), b"untouched");
        assert_eq!(std::fs::read(root.join("release")).unwrap(), b"JAVA_VERSION=21");
    }

    #[test]
    fn hard_links_share_content_with_their_source() {
        let bytes = build_tar_gz(&[
            file("jdk-21/lib/libjvm.so", b"shared object", 0o755),
            Fixture {
                name: "jdk-21/lib/server/libjvm.so",
                kind: EntryType::Link,
                data: b"",
                mode: 0o755,
                link: Some("jdk-21/lib/libjvm.so"),
            },
        ]);
        let root = tempdir().unwrap();
        extract_tar_gz(bytes.as_slice(), root.path()).unwrap();

        assert_eq!(
            std::fs::read(root.path().join("jdk-21/lib/server/libjvm.so")).unwrap(),
            b"shared object"
        );
    }

    #[test]
    fn hard_link_to_outside_is_rejected() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("jre");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret"), b"s3cr3t").unwrap();

        let bytes = build_tar_gz(&[Fixture {
            name: "jdk-21/leak",
            kind: EntryType::Link,
            data: b"",
            mode: 0o644,
            link: Some("../secret"),
        }]);

        let err = extract_tar_gz(bytes.as_slice(), &root).unwrap_err();
        assert!(matches!(err, HipoError::PathTraversal { .. }), "{err:?}");
        assert!(!root.join("jdk-21/leak").exists());
    }
}
