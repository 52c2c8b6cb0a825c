use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use flate2::write::GzEncoder;
use methsum::data_structs::enums::Context;
use methsum::{
    Accumulator, CoverageTable, DepthHistogram, FileSetDriver, LevelHistogram,
    OpenFailurePolicy,
};
use rstest::rstest;
use tempfile::TempDir;

fn write_plain(
    dir: &TempDir,
    name: &str,
    content: &str,
) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn write_gz(
    dir: &TempDir,
    name: &str,
    content: &str,
) -> PathBuf {
    let path = dir.path().join(name);
    let mut encoder =
        GzEncoder::new(File::create(&path).unwrap(), flate2::Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

fn render<A: Accumulator>(accumulator: &A) -> String {
    let mut out = Vec::new();
    accumulator.write_tsv(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// Plain-text and gzip inputs must produce identical tables, malformed
/// lines dropped along the way.
#[test]
fn distribution_reads_plain_and_gzip_alike() {
    let dir = TempDir::new().unwrap();
    let report = "chr1\t100\t+\t8\t2\tCG\tCGT\n\
                  chr1\t101\t+\t0\t0\tCG\tCGT\n\
                  truncated line\n\
                  chr1\t102\t-\t1\t3\tCHH\tCAT\n";
    let plain = write_plain(&dir, "sample.txt", report);
    let gz = write_gz(&dir, "sample.txt.gz", report);

    let mut from_plain = LevelHistogram::new();
    FileSetDriver::new(vec![plain])
        .run(&mut from_plain, None)
        .unwrap();

    let mut from_gz = LevelHistogram::new();
    FileSetDriver::new(vec![gz]).run(&mut from_gz, None).unwrap();

    let expected = "context\tmethylation_level\tcount\treadsM\treadsN\n\
                    CG\t80\t1\t8\t10\n\
                    CHH\t25\t1\t1\t4\n";
    assert_eq!(render(&from_plain), expected);
    assert_eq!(render(&from_gz), expected);
}

/// The (n+1)-th distinct context aborts the file it appears in; stats from
/// completed files and from later files survive.
#[test]
fn context_overflow_aborts_only_the_current_file() {
    let dir = TempDir::new().unwrap();

    let full_set: String = (0..10)
        .map(|i| format!("chr1\t{}\t+\t1\t1\tC{}\tCNN\n", i + 1, i))
        .collect();
    let first = write_plain(&dir, "first.txt", &full_set);
    // The overflowing label comes first, so nothing of this file counts.
    let second = write_plain(
        &dir,
        "second.txt",
        "chr1\t1\t+\t1\t1\tC10\tCNN\n\
         chr1\t2\t+\t1\t1\tC0\tCNN\n",
    );
    let third = write_plain(&dir, "third.txt", "chr1\t3\t+\t1\t1\tC0\tCNN\n");

    let mut histogram = LevelHistogram::new();
    FileSetDriver::new(vec![first, second, third])
        .run(&mut histogram, None)
        .unwrap();

    assert_eq!(histogram.registry().len(), 10);
    assert_eq!(histogram.registry().get("C10"), None);
    // One hit from the first file, one from the third, none from the
    // aborted second.
    assert_eq!(histogram.bucket("C0", 50).unwrap().count, 2);
}

/// Depth summary over a gzip file, including the saturating top bucket.
#[test]
fn depth_clamps_and_renders_dense_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_gz(
        &dir,
        "depth.txt.gz",
        "chr1\t1\t+\t8\t2\tCG\tCGT\n\
         chr1\t2\t+\t150\t100\tCG\tCGT\n\
         chr1\t3\t+\t0\t0\tCG\tCGT\n",
    );

    let mut histogram = DepthHistogram::new();
    FileSetDriver::new(vec![path]).run(&mut histogram, None).unwrap();

    let rendered = render(&histogram);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 201);
    assert_eq!(lines[0], "Depth\tCG");
    assert_eq!(lines[10], "10\t1");
    assert_eq!(lines[200], "200\t1");
}

/// Coverage table end to end: unknown contexts vanish, zero-read sites
/// count but stay uncovered, rows come in fixed context order.
#[test]
fn coverage_table_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_plain(
        &dir,
        "cov.txt",
        "chr1\t1\t+\t8\t2\tCG\tCGT\n\
         chr1\t2\t+\t0\t0\tCHG\tCAG\n\
         chr9\t3\t+\t5\t5\tCNN\tCNT\n",
    );

    let mut coverage = CoverageTable::new();
    FileSetDriver::new(vec![path]).run(&mut coverage, None).unwrap();

    assert_eq!(coverage.len(), 1);
    assert_eq!(
        render(&coverage),
        "Chromosome\tContext\tCount\tcovered\ttotalReadsM\ttotalReadsN\n\
         chr1\tCG\t1\t1\t8\t10\n\
         chr1\tCHG\t1\t0\t0\t0\n\
         chr1\tCHH\t0\t0\t0\t0\n"
    );
}

/// An unreadable input is skipped under the default policy and fatal under
/// the strict one.
#[rstest]
#[case::lenient(OpenFailurePolicy::Skip, true)]
#[case::strict(OpenFailurePolicy::Abort, false)]
fn open_failure_policy_governs_missing_files(
    #[case] policy: OpenFailurePolicy,
    #[case] should_succeed: bool,
) {
    let dir = TempDir::new().unwrap();
    let present = write_plain(&dir, "present.txt", "chr1\t1\t+\t8\t2\tCG\tCGT\n");
    let missing = dir.path().join("missing.txt");

    let mut histogram = LevelHistogram::new();
    let result = FileSetDriver::new(vec![missing, present])
        .with_policy(policy)
        .run(&mut histogram, None);

    assert_eq!(result.is_ok(), should_succeed);
    if should_succeed {
        assert_eq!(histogram.bucket("CG", 80).unwrap().count, 1);
    }
}

/// Strict mode refuses extensions outside the recognized report set before
/// reading a byte.
#[test]
fn strict_mode_rejects_unrecognized_extensions() {
    let dir = TempDir::new().unwrap();
    let odd = write_plain(&dir, "report.cov", "chr1\t1\t+\t8\t2\tCG\tCGT\n");

    let mut histogram = LevelHistogram::new();
    let err = FileSetDriver::new(vec![odd.clone()])
        .with_policy(OpenFailurePolicy::Abort)
        .run(&mut histogram, None)
        .unwrap_err();
    assert!(err.to_string().contains("failed to process"));

    // The same file sails through the lenient policy as plain text.
    let mut lenient = LevelHistogram::new();
    FileSetDriver::new(vec![odd]).run(&mut lenient, None).unwrap();
    assert_eq!(lenient.bucket("CG", 80).unwrap().count, 1);
}

/// Partitioned reduction merged in input order matches the sequential run
/// byte for byte.
#[test]
fn parallel_run_matches_sequential_output() {
    let dir = TempDir::new().unwrap();
    let first = write_plain(
        &dir,
        "a.txt",
        "chr1\t1\t+\t8\t2\tCG\tCGT\n\
         chr1\t2\t+\t1\t3\tCHH\tCAT\n",
    );
    let second = write_gz(
        &dir,
        "b.txt.gz",
        "chr2\t1\t+\t4\t4\tCHG\tCAG\n\
         chr2\t2\t+\t8\t2\tCG\tCGT\n",
    );

    let driver = FileSetDriver::new(vec![first, second]);

    let mut sequential = LevelHistogram::new();
    driver.run(&mut sequential, None).unwrap();
    let parallel: LevelHistogram = driver.run_parallel().unwrap();

    assert_eq!(render(&sequential), render(&parallel));
}

/// Feeding the same input through two instances and merging doubles every
/// tally of a single run.
#[test]
fn merged_double_run_doubles_every_tally() {
    let dir = TempDir::new().unwrap();
    let path = write_plain(
        &dir,
        "cov.txt",
        "chr1\t1\t+\t8\t2\tCG\tCGT\n\
         chr3\t2\t+\t0\t1\tCHH\tCAT\n",
    );
    let driver = FileSetDriver::new(vec![path]);

    let mut once = CoverageTable::new();
    driver.run(&mut once, None).unwrap();

    let mut twice = CoverageTable::new();
    driver.run(&mut twice, None).unwrap();
    let again = twice.clone();
    twice.merge(&again).unwrap();

    for chr in ["chr1", "chr3"] {
        for context in Context::ALL {
            let single = once.tally(chr, context).unwrap();
            let doubled = twice.tally(chr, context).unwrap();
            assert_eq!(doubled.count, single.count * 2);
            assert_eq!(doubled.covered, single.covered * 2);
            assert_eq!(doubled.sum_m, single.sum_m * 2);
            assert_eq!(doubled.sum_total, single.sum_total * 2);
        }
    }
}
