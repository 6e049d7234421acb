use swsb_core::common::PipeId;
use swsb_core::ir::{Block, Instruction, Kernel, Operand, Unit};

/// Integer pipe of the default target.
pub const INT: PipeId = PipeId(0);
/// Float pipe of the default target.
pub const FLOAT: PipeId = PipeId(1);
/// Long pipe of the default target.
pub const LONG: PipeId = PipeId(2);

/// One full GRF row.
pub fn r(reg: u32) -> Operand {
    Operand::grf(reg, 32)
}

fn with_sources(mut inst: Instruction, srcs: &[u32]) -> Instruction {
    for &s in srcs {
        inst = inst.reading(r(s));
    }
    inst
}

/// In-order integer op writing `dst` from `srcs`.
pub fn alu(dst: u32, srcs: &[u32]) -> Instruction {
    with_sources(Instruction::new("add").in_order(INT).writing(r(dst)), srcs)
}

/// In-order float op writing `dst` from `srcs`.
pub fn fpu(dst: u32, srcs: &[u32]) -> Instruction {
    with_sources(Instruction::new("mad").in_order(FLOAT).writing(r(dst)), srcs)
}

/// In-order op on an arbitrary pipe.
pub fn on_pipe(pipe: PipeId, dst: u32, srcs: &[u32]) -> Instruction {
    with_sources(Instruction::new("mov").in_order(pipe).writing(r(dst)), srcs)
}

/// Out-of-order load of `dst` addressed by `addr`.
pub fn load(dst: u32, addr: u32) -> Instruction {
    Instruction::new("send")
        .out_of_order(Unit::Send)
        .writing(r(dst))
        .reading(r(addr))
}

/// Out-of-order store of `data` addressed by `addr`; writes nothing.
pub fn store(addr: u32, data: u32) -> Instruction {
    Instruction::new("sends")
        .out_of_order(Unit::Send)
        .reading(r(addr))
        .reading(r(data))
}

/// Out-of-order extended-math op.
pub fn math(dst: u32, src: u32) -> Instruction {
    Instruction::new("math")
        .out_of_order(Unit::Math)
        .writing(r(dst))
        .reading(r(src))
}

/// Block-terminating branch reading `src`.
pub fn jump(src: u32) -> Instruction {
    Instruction::new("jmpi").in_order(INT).reading(r(src)).branch()
}

/// Block-terminating call writing its return address to `ret`.
pub fn call(ret: u32) -> Instruction {
    Instruction::new("call").in_order(INT).writing(r(ret)).branch()
}

/// Single-block kernel.
pub fn kernel(insts: Vec<Instruction>) -> Kernel {
    Kernel::new("test", vec![Block::new("entry", insts)])
}

/// Multi-block kernel with labels `B0`, `B1`, ...
pub fn kernel_blocks(blocks: Vec<Vec<Instruction>>) -> Kernel {
    Kernel::new(
        "test",
        blocks
            .into_iter()
            .enumerate()
            .map(|(i, insts)| Block::new(format!("B{i}"), insts))
            .collect(),
    )
}
