use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use itertools::Itertools;
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::de::IoRead;
use serde_json::{Deserializer, StreamDeserializer};
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

use crate::corpus::{AlignedArticle, AlignedArticleProcessor, Article, TokenizedAlignedArticle};
use crate::error::Result;

/// Drops articles whose word count falls outside `[min, max]` in any
/// tokenized language. Either bound may be absent.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenCountFilter {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl TokenCountFilter {
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max }
    }

    pub fn accepts(&self, count: usize) -> bool {
        self.min.map_or(true, |min| count >= min) && self.max.map_or(true, |max| count <= max)
    }

    fn keeps(&self, article: &TokenizedAlignedArticle) -> bool {
        article
            .articles()
            .values()
            .filter_map(|tokenized| tokenized.word_count())
            .all(|count| self.accepts(count))
    }
}

/// Controls the on-disk behavior of the bulk pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Where the temp files live; the system temp dir when absent.
    pub temp_folder: Option<PathBuf>,
    /// Deflate-compress every temp file.
    pub deflate_temp_files: bool,
    /// Unlink each temp file right after it was appended to the output.
    pub delete_temp_files_immediately: bool,
    /// Wrap the bulk output in LZMA.
    pub compress_result: bool,
}

impl StoreOptions {
    fn temp_folder(&self) -> PathBuf {
        self.temp_folder
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// A restartable, lazy reader over newline/whitespace-delimited JSON records.
/// The file is opened on the first call to `next` and released on drop.
pub struct AlignedReader<T> {
    path: PathBuf,
    state: ReaderState<T>,
}

enum ReaderState<T> {
    Unopened,
    Open(StreamDeserializer<'static, IoRead<BufReader<File>>, T>),
    Failed,
}

impl<T: DeserializeOwned> AlignedReader<T> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: ReaderState::Unopened,
        }
    }

    /// Restarts the sequence from the beginning of the file.
    pub fn restart(&mut self) {
        self.state = ReaderState::Unopened;
    }
}

impl<T: DeserializeOwned> Iterator for AlignedReader<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match &mut self.state {
                ReaderState::Unopened => match File::open(&self.path) {
                    Ok(file) => {
                        self.state = ReaderState::Open(
                            Deserializer::from_reader(BufReader::new(file)).into_iter(),
                        );
                    }
                    Err(err) => {
                        self.state = ReaderState::Failed;
                        return Some(Err(err.into()));
                    }
                },
                ReaderState::Open(stream) => {
                    return match stream.next() {
                        None => None,
                        Some(Ok(value)) => Some(Ok(value)),
                        Some(Err(err)) => {
                            self.state = ReaderState::Failed;
                            Some(Err(err.into()))
                        }
                    }
                }
                ReaderState::Failed => return None,
            }
        }
    }
}

/// Streams raw aligned articles from `path`.
pub fn read_aligned_articles(path: impl AsRef<Path>) -> AlignedReader<AlignedArticle<Article>> {
    AlignedReader::new(path)
}

/// Streams already-tokenized aligned articles from `path`.
pub fn read_aligned_parsed_articles(path: impl AsRef<Path>) -> AlignedReader<TokenizedAlignedArticle> {
    AlignedReader::new(path)
}

/// Streams aligned articles from `path`, tokenizing each one with
/// `processor` on the fly.
pub fn read_and_parse_aligned_articles(
    path: impl AsRef<Path>,
    processor: AlignedArticleProcessor,
) -> impl Iterator<Item = Result<TokenizedAlignedArticle>> {
    read_aligned_articles(path).map(move |value| value.map(|article| processor.process(article)))
}

fn write_temp_file(path: &Path, payload: &[u8], deflate: bool) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    if deflate {
        let mut encoder = DeflateEncoder::new(&mut file, Compression::default());
        encoder.write_all(payload)?;
        encoder.finish()?;
    } else {
        file.write_all(payload)?;
    }
    file.flush()
}

fn read_temp_file(path: &Path, deflate: bool) -> std::io::Result<Vec<u8>> {
    let mut payload = Vec::new();
    let file = BufReader::new(File::open(path)?);
    if deflate {
        DeflateDecoder::new(file).read_to_end(&mut payload)?;
    } else {
        let mut file = file;
        file.read_to_end(&mut payload)?;
    }
    Ok(payload)
}

fn cleanup_temp_files(files: &[(usize, Option<PathBuf>)]) {
    for (_, path) in files {
        if let Some(path) = path {
            let _ = std::fs::remove_file(path);
        }
    }
}

enum BulkWriter {
    Plain(BufWriter<File>),
    Xz(XzEncoder<BufWriter<File>>),
}

impl BulkWriter {
    fn new(file: File, compress: bool) -> Self {
        let buffered = BufWriter::new(file);
        if compress {
            Self::Xz(XzEncoder::new(buffered, 6))
        } else {
            Self::Plain(buffered)
        }
    }

    fn finish(self) -> std::io::Result<()> {
        match self {
            BulkWriter::Plain(mut writer) => writer.flush(),
            BulkWriter::Xz(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for BulkWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            BulkWriter::Plain(writer) => writer.write(buf),
            BulkWriter::Xz(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            BulkWriter::Plain(writer) => writer.flush(),
            BulkWriter::Xz(encoder) => encoder.flush(),
        }
    }
}

/// Tokenizes every article of `path_in`, drops the ones failing `filter`,
/// and packages the survivors into `path_out` as length-prefixed JSON
/// records, optionally LZMA-wrapped. Returns the number of surviving
/// articles. Any error aborts the run after best-effort temp cleanup.
pub fn read_and_parse_aligned_articles_into(
    path_in: impl AsRef<Path>,
    path_out: impl AsRef<Path>,
    processor: &AlignedArticleProcessor,
    filter: Option<TokenCountFilter>,
    store_options: StoreOptions,
) -> Result<usize> {
    // fail early when the input cannot be opened at all
    drop(File::open(path_in.as_ref())?);

    let temp_folder = store_options.temp_folder();
    let deflate = store_options.deflate_temp_files;
    log::debug!(
        "bulk processing {:?} -> {:?} via {:?}",
        path_in.as_ref(),
        path_out.as_ref(),
        temp_folder
    );

    let reader = read_aligned_articles(path_in);
    let mut files: Vec<(usize, Option<PathBuf>)> = Vec::new();
    let results: Vec<(usize, Result<Option<PathBuf>>)> = reader
        .enumerate()
        .par_bridge()
        .map(|(idx, value)| {
            let result = value.and_then(|article| {
                let tokenized = processor.process(article);
                if let Some(filter) = filter {
                    if !filter.keeps(&tokenized) {
                        return Ok(None);
                    }
                }
                let payload = serde_json::to_vec(&tokenized)?;
                let temp_file = temp_folder.join(format!(
                    "crosstopic_bulk_{}_{idx}.json",
                    std::process::id()
                ));
                write_temp_file(&temp_file, &payload, deflate)?;
                Ok(Some(temp_file))
            });
            (idx, result)
        })
        .collect();

    let mut sorted = results;
    sorted.sort_by_key(|(idx, _)| *idx);
    for (idx, result) in sorted {
        match result {
            Ok(path) => files.push((idx, path)),
            Err(err) => {
                cleanup_temp_files(&files);
                return Err(err);
            }
        }
    }

    let mut writer = BulkWriter::new(File::create(path_out.as_ref())?, store_options.compress_result);

    let mut written = 0usize;
    for (_, temp_path) in files.iter() {
        let Some(temp_path) = temp_path else { continue };
        let payload = match read_temp_file(temp_path, deflate) {
            Ok(payload) => payload,
            Err(err) => {
                drop(writer);
                let _ = std::fs::remove_file(path_out.as_ref());
                cleanup_temp_files(&files);
                return Err(err.into());
            }
        };
        writer.write_all(&(payload.len() as u64).to_le_bytes())?;
        writer.write_all(&payload)?;
        written += 1;
        if store_options.delete_temp_files_immediately {
            let _ = std::fs::remove_file(temp_path);
        }
    }
    writer.finish()?;

    if !store_options.delete_temp_files_immediately {
        cleanup_temp_files(&files);
    }

    log::debug!("bulk processing kept {written} articles");
    Ok(written)
}

/// Reads a packaged bulk output back into memory.
pub fn read_packaged_articles(
    path: impl AsRef<Path>,
    compressed: bool,
) -> Result<Vec<TokenizedAlignedArticle>> {
    let file = BufReader::new(File::open(path)?);
    let mut reader: Box<dyn Read> = if compressed {
        Box::new(XzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut result = Vec::new();
    loop {
        let mut length = [0u8; 8];
        match reader.read_exact(&mut length) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        }
        let mut payload = vec![0u8; u64::from_le_bytes(length) as usize];
        reader.read_exact(&mut payload)?;
        result.push(serde_json::from_slice(&payload)?);
    }
    Ok(result)
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::{
        read_aligned_articles, read_and_parse_aligned_articles,
        read_and_parse_aligned_articles_into, read_packaged_articles, StoreOptions,
        TokenCountFilter,
    };
    use crate::corpus::test::{aligned, en_de_processor};

    fn write_corpus(name: &str, articles: &[crate::corpus::AlignedArticle<crate::corpus::Article>]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for article in articles {
            serde_json::to_writer(&mut file, article).unwrap();
            file.write_all(b"\n").unwrap();
        }
        path
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn streaming_reader_is_restartable() {
        let path = write_corpus(
            "crosstopic_stream_test.bulkjson",
            &[aligned(1, "one", "eins"), aligned(2, "two", "zwei")],
        );
        let mut reader = read_aligned_articles(&path);
        assert_eq!(1, reader.next().unwrap().unwrap().article_id());
        reader.restart();
        assert_eq!(1, reader.next().unwrap().unwrap().article_id());
        assert_eq!(2, reader.next().unwrap().unwrap().article_id());
        assert!(reader.next().is_none());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_surfaces_an_error() {
        let mut reader = read_aligned_articles("/definitely/not/here.bulkjson");
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn streaming_parse_tokenizes_articles() {
        let path = write_corpus(
            "crosstopic_parse_test.bulkjson",
            &[aligned(1, "hello world", "hallo welt")],
        );
        let processed: Vec<_> = read_and_parse_aligned_articles(&path, en_de_processor())
            .map(|value| value.unwrap())
            .collect();
        assert_eq!(1, processed.len());
        assert_eq!(Some(2), processed[0].get("en").unwrap().word_count());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn token_count_filter_bounds_work() {
        let filter = TokenCountFilter::new(Some(10), Some(200));
        assert!(!filter.accepts(2));
        assert!(filter.accepts(50));
        assert!(!filter.accepts(500));
        let unbounded = TokenCountFilter::new(None, Some(3));
        assert!(unbounded.accepts(0));
        assert!(!unbounded.accepts(4));
    }

    #[test]
    fn bulk_pipeline_filters_and_packages() {
        let corpus = [
            aligned(1, &words(2), &words(2)),
            aligned(2, &words(50), &words(50)),
            aligned(3, &words(500), &words(500)),
        ];
        let path_in = write_corpus("crosstopic_bulk_in.bulkjson", &corpus);
        let path_out = std::env::temp_dir().join("crosstopic_bulk_out.bulk");

        let kept = read_and_parse_aligned_articles_into(
            &path_in,
            &path_out,
            &en_de_processor(),
            Some(TokenCountFilter::new(Some(10), Some(200))),
            StoreOptions::default(),
        )
        .unwrap();
        assert_eq!(1, kept);

        let packaged = read_packaged_articles(&path_out, false).unwrap();
        assert_eq!(1, packaged.len());
        assert_eq!(2, packaged[0].article_id());

        std::fs::remove_file(path_in).unwrap();
        std::fs::remove_file(path_out).unwrap();
    }

    #[test]
    fn bulk_pipeline_supports_compression_options() {
        let corpus = [aligned(1, "hello world", "hallo welt")];
        let path_in = write_corpus("crosstopic_bulk_lzma_in.bulkjson", &corpus);
        let path_out = std::env::temp_dir().join("crosstopic_bulk_lzma_out.bulk.xz");

        let kept = read_and_parse_aligned_articles_into(
            &path_in,
            &path_out,
            &en_de_processor(),
            None,
            StoreOptions {
                deflate_temp_files: true,
                delete_temp_files_immediately: true,
                compress_result: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(1, kept);

        let packaged = read_packaged_articles(&path_out, true).unwrap();
        assert_eq!(1, packaged.len());

        std::fs::remove_file(path_in).unwrap();
        std::fs::remove_file(path_out).unwrap();
    }
}
