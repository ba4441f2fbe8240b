use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dirscan::fs::{Attributes, DirEntry, SafeAccessGuard, SortSpec, SortStrategy, scan_dir};
use dirscan::reparse::ReparsePointResolver;
use dirscan::util::Wildcard;
use std::hint::black_box;

// Build a reparse buffer by hand: tag, data length, reserved, payload
fn reparse_buffer(tag: u32, payload: &[u8]) -> Vec<u8> {
    let mut buf = tag.to_le_bytes().to_vec();
    buf.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    buf.extend_from_slice(&[0, 0]);
    buf.extend_from_slice(payload);
    buf
}

fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

fn symlink_buffer(substitute: &str, print: &str) -> Vec<u8> {
    let (sub, prn) = (utf16(substitute), utf16(print));
    let mut payload = Vec::new();
    for field in [0, sub.len(), sub.len(), prn.len()] {
        payload.extend_from_slice(&(field as u16).to_le_bytes());
    }
    payload.extend_from_slice(&0u32.to_le_bytes());
    payload.extend_from_slice(&sub);
    payload.extend_from_slice(&prn);
    reparse_buffer(0xA000_000C, &payload)
}

fn appx_buffer() -> Vec<u8> {
    let mut payload = 4u32.to_le_bytes().to_vec();
    for s in [
        "Microsoft.WindowsTerminal_8wekyb3d8bbwe",
        "Microsoft.WindowsTerminal_8wekyb3d8bbwe!App",
        r"C:\Program Files\WindowsApps\Microsoft.WindowsTerminal\wt.exe",
        "0",
    ] {
        payload.extend_from_slice(&utf16(s));
        payload.extend_from_slice(&[0, 0]);
    }
    reparse_buffer(0x8000_001B, &payload)
}

fn synthetic_entries(count: usize) -> Vec<DirEntry> {
    (0..count)
        .map(|i| {
            // mix cases and kinds so every comparison path is taken
            let name = if i % 3 == 0 { format!("dir/Entry_{i:05}") } else { format!("dir/entry_{i:05}.txt") };
            let attributes = if i % 7 == 0 { Attributes::DIRECTORY } else { Attributes::NORMAL };
            DirEntry::new(name, attributes).unwrap()
        })
        .collect()
}

fn bench_sort(c: &mut Criterion) {
    let entries = synthetic_entries(10_000);
    let mut group = c.benchmark_group("sort");
    group.throughput(Throughput::Elements(entries.len() as u64));

    for strategy in [SortStrategy::Name, SortStrategy::FilesFirst, SortStrategy::DirsFirst] {
        for exact_case in [false, true] {
            let spec = SortSpec::new(strategy).exact_case(exact_case);
            let id = format!("{strategy}{}", if exact_case { "_exact" } else { "" });
            group.bench_with_input(BenchmarkId::new("sort", id), &spec, |b, spec| {
                b.iter_batched(
                    || entries.clone(),
                    |mut batch| {
                        spec.sort(&mut batch);
                        black_box(batch)
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let resolver = ReparsePointResolver::new();
    let cases = [
        ("symlink", symlink_buffer(r"\??\C:\Users\Public\Documents", r"C:\Users\Public\Documents")),
        ("appx", appx_buffer()),
    ];
    let mut group = c.benchmark_group("reparse_decode");
    for (name, buffer) in &cases {
        group.bench_with_input(BenchmarkId::new("decode", name), buffer, |b, buffer| {
            b.iter(|| black_box(resolver.decode(black_box(buffer))));
        });
    }
    group.finish();
}

fn bench_wildcard(c: &mut Criterion) {
    let names: Vec<String> = (0..1_000).map(|i| format!("report_{i}.{}", if i % 2 == 0 { "log" } else { "txt" })).collect();
    let mut group = c.benchmark_group("wildcard");
    group.throughput(Throughput::Elements(names.len() as u64));
    for pattern in ["*", "*.LOG", "report_?2.*"] {
        let wildcard = Wildcard::new(pattern).unwrap();
        group.bench_with_input(BenchmarkId::new("match", pattern), &wildcard, |b, wildcard| {
            b.iter(|| names.iter().filter(|n| wildcard.is_match(black_box(n))).count());
        });
    }
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..500 {
        std::fs::write(dir.path().join(format!("file_{i}.dat")), b"x").unwrap();
    }
    let root = dir.path().to_str().unwrap().to_owned();
    let guard = SafeAccessGuard::new();

    c.bench_function("scan_dir_500", |b| {
        b.iter(|| black_box(scan_dir(&root, None, None, &guard).unwrap().len()));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(std::time::Duration::from_millis(500))
        .measurement_time(std::time::Duration::from_secs(3));
    targets = bench_sort, bench_decode, bench_wildcard, bench_scan
}
criterion_main!(benches);
