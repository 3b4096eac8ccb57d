use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reads a text corpus and returns its lines.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
/// - Drops lines that are empty or whitespace only
pub fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let contents = fs::read_to_string(filename)?;
	Ok(contents
		.lines()
		.filter(|line| !line.trim().is_empty())
		.map(str::to_owned)
		.collect())
}

/// Path of the file sitting next to a corpus under another extension.
///
/// Used to locate the binary snapshot of a text corpus:
/// `data/corpus.txt` + `"bin"` → `data/corpus.bin`
///
/// # Errors
/// Fails if `input_path` has no file name.
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Corpus name of a file: its file name without directory or extension.
///
/// This is the name the server lists and accepts in `names=`, e.g.
/// `./data/corpus.txt` → `corpus`.
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Lists the corpus names (see `get_filename`) of the files with `extension`
/// directly inside `dir`, sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
			files.push(get_filename(&path)?);
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_path_swaps_extension() {
		let path = build_output_path("data/corpus.txt", "bin").expect("valid path");
		assert_eq!(path, PathBuf::from("data/corpus.bin"));
	}

	#[test]
	fn filename_without_extension() {
		assert_eq!(get_filename("./data/corpus.txt").expect("valid path"), "corpus");
	}

	#[test]
	fn read_and_list() -> io::Result<()> {
		let dir = tempfile::tempdir()?;
		fs::write(dir.path().join("b.txt"), "first line\n\n  \r\nsecond line\r\n")?;
		fs::write(dir.path().join("a.txt"), "")?;
		fs::write(dir.path().join("a.bin"), [0u8])?;

		assert_eq!(read_lines(dir.path().join("b.txt"))?, vec!["first line", "second line"]);
		assert_eq!(list_files(dir.path(), "txt")?, vec!["a", "b"]);
		Ok(())
	}
}
