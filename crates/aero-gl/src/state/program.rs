use tracing::debug;

use super::{replace, GlState};
use crate::dirty::StateMask;
use crate::handle::Handle;
use crate::types::ShaderStage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderRecord {
    pub stage: ShaderStage,
    /// Set by the shader compiler collaborator once the module exists.
    pub compiled: bool,
}

impl ShaderRecord {
    pub fn new(stage: ShaderStage) -> Self {
        Self {
            stage,
            compiled: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgramRecord {
    /// One shader per stage, indexed by [`ShaderStage::slot`].
    pub shaders: [Handle; ShaderStage::COUNT],
    pub linked: bool,
    /// Bumped by every successful link; folded into the pipeline hash.
    pub link_generation: u64,
}

impl ProgramRecord {
    pub fn shader(&self, stage: ShaderStage) -> Handle {
        self.shaders[stage.slot()]
    }

    pub(crate) fn detach(&mut self, shader: Handle) {
        for slot in &mut self.shaders {
            if *slot == shader {
                *slot = Handle::NONE;
            }
        }
    }
}

impl GlState {
    /// Attach `shader` in its stage's slot, replacing any shader already there.
    pub fn attach_shader(&mut self, program: Handle, shader: Handle) {
        let Some(stage) = self.objects.shaders.get(shader).map(|s| s.stage) else {
            return;
        };
        if let Some(record) = self.objects.programs.get_mut(program) {
            record.shaders[stage.slot()] = shader;
        }
    }

    pub fn detach_shader(&mut self, program: Handle, shader: Handle) {
        if shader.is_none() {
            return;
        }
        if let Some(record) = self.objects.programs.get_mut(program) {
            record.detach(shader);
        }
    }

    pub fn set_shader_compiled(&mut self, shader: Handle, compiled: bool) {
        if let Some(record) = self.objects.shaders.get_mut(shader) {
            record.compiled = compiled;
        }
    }

    /// Link `program`. It links when at least one shader is attached and every attached shader
    /// has compiled. Relinking the current program marks `PROGRAM`; the pipeline it keys has
    /// changed even though the handle has not.
    pub fn link_program(&mut self, program: Handle) -> bool {
        let Some(record) = self.objects.programs.get(program) else {
            return false;
        };
        let mut attached = record.shaders.iter().filter(|s| s.is_some()).peekable();
        let ok = attached.peek().is_some()
            && attached.all(|s| self.objects.shaders.get(*s).is_some_and(|r| r.compiled));

        let Some(record) = self.objects.programs.get_mut(program) else {
            return false;
        };
        record.linked = ok;
        if ok {
            record.link_generation += 1;
        }
        debug!(handle = ?program, linked = ok, "linked program");
        if self.program == program {
            self.mark(StateMask::PROGRAM);
        }
        ok
    }

    /// `glUseProgram`. Unlinked programs are accepted; validation reports them at draw time.
    pub fn use_program(&mut self, program: Handle) {
        if !self.objects.programs.is_bindable(program) {
            debug!(?program, "ignoring use of unknown program");
            return;
        }
        if replace(&mut self.program, program) {
            self.mark(StateMask::PROGRAM);
        }
    }
}
