use crate::data::idx;
use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Public MNIST mirror serving the four canonical gzipped IDX files.
const MIRROR: &str = "https://ossci-datasets.s3.amazonaws.com/mnist";

const N_CLASSES: usize = 10;

/// Which half of the canonical train/test partition to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    fn image_file(self) -> &'static str {
        match self {
            Split::Train => "train-images-idx3-ubyte",
            Split::Test => "t10k-images-idx3-ubyte",
        }
    }

    fn label_file(self) -> &'static str {
        match self {
            Split::Train => "train-labels-idx1-ubyte",
            Split::Test => "t10k-labels-idx1-ubyte",
        }
    }
}

/// One split of MNIST: flat normalized pixel vectors paired with integer
/// class labels.
#[derive(Debug)]
pub struct MnistSplit {
    /// Per-image pixel vectors of length rows*cols, values in [0, 1].
    pub images: Vec<Vec<f64>>,
    /// Class labels, 0–9, same length as `images`.
    pub labels: Vec<u8>,
    pub rows: usize,
    pub cols: usize,
}

impl MnistSplit {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Loads one MNIST split from `cache_dir`, downloading and decompressing any
/// missing file first. Subsequent runs read the cache directly.
pub fn load_split(cache_dir: &Path, split: Split) -> Result<MnistSplit, String> {
    let image_path = fetch_if_missing(cache_dir, split.image_file())?;
    let label_path = fetch_if_missing(cache_dir, split.label_file())?;

    let image_bytes = fs::read(&image_path)
        .map_err(|e| format!("Cannot read '{}': {}", image_path.display(), e))?;
    let label_bytes = fs::read(&label_path)
        .map_err(|e| format!("Cannot read '{}': {}", label_path.display(), e))?;

    let (images, rows, cols) = idx::parse_images(&image_bytes)?;
    let labels = idx::parse_labels(&label_bytes, N_CLASSES)?;

    if images.len() != labels.len() {
        return Err(format!(
            "MNIST split mismatch: {} images but {} labels.",
            images.len(),
            labels.len()
        ));
    }

    Ok(MnistSplit {
        images,
        labels,
        rows,
        cols,
    })
}

/// Returns the cached path for `name`, downloading `name.gz` from the mirror
/// and decompressing it on first use.
fn fetch_if_missing(cache_dir: &Path, name: &str) -> Result<PathBuf, String> {
    let path = cache_dir.join(name);
    if path.exists() {
        return Ok(path);
    }

    fs::create_dir_all(cache_dir)
        .map_err(|e| format!("Cannot create cache dir '{}': {}", cache_dir.display(), e))?;

    let url = format!("{}/{}.gz", MIRROR, name);
    println!("Downloading {} ...", url);

    let response = ureq::get(&url)
        .call()
        .map_err(|e| format!("Download of '{}' failed: {}", url, e))?;

    let mut decoder = GzDecoder::new(response.into_reader());
    let mut bytes = Vec::new();
    decoder
        .read_to_end(&mut bytes)
        .map_err(|e| format!("Decompressing '{}' failed: {}", url, e))?;

    // Write via a temp file so an interrupted download never leaves a
    // half-written file the next run would trust.
    let tmp_path = cache_dir.join(format!("{}.partial", name));
    fs::write(&tmp_path, &bytes)
        .map_err(|e| format!("Cannot write '{}': {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, &path)
        .map_err(|e| format!("Cannot move '{}' into place: {}", tmp_path.display(), e))?;

    Ok(path)
}
