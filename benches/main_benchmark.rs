use criterion::{Criterion, criterion_group, criterion_main};
use ctc::compdb::CompileCommand;
use ctc::dialect::Dialect;
use ctc::invocation::{self, CompilerInvocation};
use std::hint::black_box;

const UNIX_COMMAND: &str = "/usr/bin/clang++ -DNDEBUG -DFMT_HEADER_ONLY=1 -I/src/include \
    -isystem /src/third_party/fmt/include -O3 -std=c++20 -fPIC -Wall -Wextra \
    -MD -MT src/CMakeFiles/app.dir/main.cpp.o -MF src/CMakeFiles/app.dir/main.cpp.o.d \
    -o src/CMakeFiles/app.dir/main.cpp.o -c /src/src/main.cpp";

const MSVC_COMMAND: &str = "C:/PROGRA~1/LLVM/bin/clang-cl.exe /nologo -TP -DWIN32 -IC:/src/include \
    /D_WINDOWS /EHsc /O2 /Ob2 /DNDEBUG -MD /FoCMakeFiles/app.dir/main.cpp.obj \
    /FdTARGET_COMPILE_PDB /FS -c -- C:/src/main.cpp";

const MOCK_DATABASE: &str = r#"[
  {"directory": "/src/build", "file": "/src/a.c", "command": "cc -O2 -c /src/a.c -o a.o"},
  {"directory": "/src/build", "file": "/src/b.c", "arguments": ["cc", "-O2", "-c", "/src/b.c", "-o", "b.o"]}
]"#;

fn bench_parse_unix(c: &mut Criterion) {
    c.bench_function("parse_unix_command", |b| {
        b.iter(|| invocation::parse(black_box(UNIX_COMMAND)).unwrap())
    });
}

fn bench_parse_msvc(c: &mut Criterion) {
    c.bench_function("parse_msvc_command", |b| {
        b.iter(|| invocation::parse(black_box(MSVC_COMMAND)).unwrap())
    });
}

fn bench_from_words(c: &mut Criterion) {
    let words = shlex::split(UNIX_COMMAND).unwrap();
    c.bench_function("invocation_from_words", |b| {
        b.iter(|| CompilerInvocation::from_words(black_box(words.clone())).unwrap())
    });
}

fn bench_dialect_detect(c: &mut Criterion) {
    let extra = vec!["cl-wrapper".to_string()];
    c.bench_function("dialect_detect", |b| {
        b.iter(|| {
            Dialect::detect(black_box(r"C:\PROGRA~1\LLVM\bin\clang-cl.exe"), &extra);
            Dialect::detect(black_box("/usr/bin/x86_64-linux-gnu-g++-13"), &extra)
        })
    });
}

fn bench_compdb_parse(c: &mut Criterion) {
    c.bench_function("parse_compile_commands", |b| {
        b.iter(|| {
            let entries: Vec<CompileCommand> =
                serde_json::from_str(black_box(MOCK_DATABASE)).unwrap();
            entries
                .iter()
                .map(|e| e.invocation().unwrap())
                .collect::<Vec<_>>()
        })
    });
}

criterion_group!(
    benches,
    bench_parse_unix,
    bench_parse_msvc,
    bench_from_words,
    bench_dialect_detect,
    bench_compdb_parse
);
criterion_main!(benches);
