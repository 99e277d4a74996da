//! Shared test fixtures: a mock program backend standing in for the host
//! engine's compile service.

use std::collections::HashSet;

use sumi::{CompileError, ProgramBackend, ProgramDescriptor, ProgramHandle};

/// In-memory [`ProgramBackend`] with scriptable failures and async compiles.
#[derive(Default)]
pub struct MockBackend {
    next_handle: u64,
    ready: HashSet<u64>,
    /// Every compile call, by canonical flag key, failures included.
    pub attempts: Vec<String>,
    pub destroyed: Vec<ProgramHandle>,
    /// Compilation fails while any of these defines is present.
    pub failing_defines: HashSet<&'static str>,
    /// Every compilation fails.
    pub fail_all: bool,
    /// New programs stay unready until [`promote_all`](Self::promote_all).
    pub async_compile: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(defines: &[&'static str]) -> Self {
        Self {
            failing_defines: defines.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn async_backend() -> Self {
        Self {
            async_compile: true,
            ..Self::default()
        }
    }

    /// Marks every issued program as ready.
    pub fn promote_all(&mut self) {
        for handle in 0..self.next_handle {
            self.ready.insert(handle);
        }
    }

    /// Number of successful compilations.
    pub fn compile_count(&self) -> usize {
        self.next_handle as usize
    }

    fn key_has_define(key: &str, define: &str) -> bool {
        key.split(',')
            .any(|flag| flag == define || flag.strip_prefix(define).is_some_and(|r| r.starts_with('=')))
    }
}

impl ProgramBackend for MockBackend {
    fn compile(
        &mut self,
        desc: &ProgramDescriptor<'_>,
    ) -> Result<ProgramHandle, CompileError> {
        self.attempts.push(desc.flag_key.to_string());
        if self.fail_all {
            return Err(CompileError {
                message: "mock backend rejects everything".to_string(),
            });
        }
        for define in &self.failing_defines {
            if Self::key_has_define(desc.flag_key, define) {
                return Err(CompileError {
                    message: format!("mock backend rejects {define}"),
                });
            }
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        if !self.async_compile {
            self.ready.insert(handle);
        }
        Ok(ProgramHandle(handle))
    }

    fn poll_ready(&self, program: ProgramHandle) -> bool {
        self.ready.contains(&program.0)
    }

    fn destroy(&mut self, program: ProgramHandle) {
        self.destroyed.push(program);
    }
}
