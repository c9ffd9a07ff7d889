//! Still-image tool command assembly and execution.
//!
//! # Layout
//!
//! ```text
//! [--frames A-B] -i INPUT --threads N [--ch CHANNELS] [--debug -v]
//! [--colorconfig PATH] <processor groups in component order> -o OUTPUT
//! ```

use tracing::debug;

use opchain_process::Processor;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::exec::{ExecutionResult, command_line, run};
use crate::io::IoSpec;

/// Assembles processor output into full command lines and runs them.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Creates a renderer.
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Renderer configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Builds the full argument list (without the program).
    ///
    /// Processor groups are ordered by family following
    /// [`RenderConfig::component_order`]; processors of the same family
    /// keep the order they were passed in. Every chain is computed before
    /// anything is returned, so a build error never leaves a partial
    /// command.
    pub fn render(&self, processors: &[&dyn Processor], io: &IoSpec) -> Result<Vec<String>> {
        let input = io.input_path()?;
        let output = io.output_path()?;

        let mut ordered: Vec<&dyn Processor> = processors.to_vec();
        ordered.sort_by_key(|p| self.config.component_rank(p.family()));

        let mut args = Vec::new();
        if let Some(frames) = io.frames {
            args.push("--frames".to_string());
            args.push(frames.to_string());
        }
        args.extend([
            "-i".to_string(),
            input,
            "--threads".to_string(),
            self.config.threads.to_string(),
        ]);
        if !self.config.channels.is_empty() {
            args.push("--ch".to_string());
            args.push(self.config.channels.clone());
        }
        if self.config.debug {
            args.push("--debug".to_string());
            args.push("-v".to_string());
        }
        if let Some(config) = &self.config.ocio_config {
            args.push("--colorconfig".to_string());
            args.push(config.replace('\\', "/"));
        }
        for p in ordered {
            let group = p.compute()?;
            debug!(family = %p.family(), len = group.len(), "processor group");
            args.extend(group);
        }
        args.push("-o".to_string());
        args.push(output);
        Ok(args)
    }

    /// Program and arguments as one printable line.
    pub fn command_line(&self, args: &[String]) -> String {
        command_line(&self.config.program, args)
    }

    /// Runs the still-image tool with `args`, blocking until it exits.
    pub fn execute(&self, args: &[String]) -> Result<ExecutionResult> {
        run(
            &self.config.program,
            args,
            &self.config.env,
            self.config.working_dir.as_deref(),
        )
    }

    /// [`render`](Self::render) then [`execute`](Self::execute).
    pub fn run(&self, processors: &[&dyn Processor], io: &IoSpec) -> Result<ExecutionResult> {
        let args = self.render(processors, io)?;
        self.execute(&args)
    }
}
