//! Error tests.

use rstest::rstest;
use swsb_core::common::{InstLocation, PipeId};
use swsb_core::config::{EncodeMode, MAX_BUCKETS, PipeModel, TargetModel};
use swsb_core::ir::{Instruction, Operand, Swsb, SyncOp, TokenField};
use swsb_core::{SwsbError, pass};

use crate::common::builder::{alu, kernel, kernel_blocks, load, on_pipe, r};

#[test]
fn test_operand_outside_register_file() {
    let k = kernel(vec![alu(1, &[2]), Instruction::new("mov").in_order(PipeId(0)).writing(r(200))]);
    let err = pass::analyze(&k, &TargetModel::default()).unwrap_err();
    assert!(matches!(
        err,
        SwsbError::UnresolvableOperand {
            at: InstLocation { block: 0, inst: 1 },
            ..
        }
    ));
    assert!(err.to_string().contains("block 0 inst 1"));
}

#[test]
fn test_missing_flag_register() {
    let cmp = Instruction::new("cmp")
        .in_order(PipeId(0))
        .reading(r(1))
        .writing(Operand::flag(9, 4));
    let err = pass::analyze(&kernel(vec![cmp]), &TargetModel::default()).unwrap_err();
    assert!(matches!(err, SwsbError::UnresolvableOperand { .. }));
}

#[test]
fn test_missing_completion_class() {
    let k = kernel(vec![Instruction::new("mov").writing(r(1))]);
    let err = pass::analyze(&k, &TargetModel::default()).unwrap_err();
    assert!(matches!(err, SwsbError::UnknownCompletionClass { .. }));
}

#[test]
fn test_pipe_missing_from_latency_table() {
    let k = kernel(vec![on_pipe(PipeId(7), 1, &[2])]);
    let err = pass::analyze(&k, &TargetModel::default()).unwrap_err();
    assert!(matches!(
        err,
        SwsbError::UnknownCompletionClass { ref mnemonic, .. } if mnemonic == "mov"
    ));
}

#[test]
fn test_classless_instruction_without_operands_is_fine() {
    let k = kernel(vec![Instruction::new("nop"), alu(1, &[2])]);
    assert!(pass::analyze(&k, &TargetModel::default()).is_ok());
}

#[test]
fn test_sync_in_input_is_rejected() {
    let k = kernel(vec![alu(1, &[2]), Instruction::sync(SyncOp::AllWr)]);
    let err = pass::analyze(&k, &TargetModel::default()).unwrap_err();
    assert_eq!(
        err,
        SwsbError::AlreadyAnnotated {
            at: InstLocation { block: 0, inst: 1 },
            mnemonic: "sync.allwr".into(),
        }
    );
}

#[test]
fn test_preset_swsb_is_rejected() {
    let mut inst = alu(1, &[2]);
    inst.swsb = Swsb::token(TokenField::Dst(swsb_core::common::TokenId(0)));
    let err = pass::analyze(&kernel(vec![inst]), &TargetModel::default()).unwrap_err();
    assert!(matches!(err, SwsbError::AlreadyAnnotated { .. }));
}

#[test]
fn test_failed_run_leaves_kernel_untouched() {
    let original = kernel_blocks(vec![
        vec![load(5, 1), alu(6, &[5])],
        vec![Instruction::new("mov").writing(r(1))],
    ]);
    let mut k = original.clone();
    assert!(pass::run(&mut k, &TargetModel::default()).is_err());
    assert_eq!(k, original);
}

#[test]
fn test_annotated_output_cannot_be_rerun() {
    let mut k = kernel(vec![load(5, 1), alu(6, &[5])]);
    let target = TargetModel::default();
    let _ = pass::run(&mut k, &target).unwrap();
    assert!(matches!(
        pass::run(&mut k, &target),
        Err(SwsbError::AlreadyAnnotated { .. })
    ));
}

fn broken(edit: fn(&mut TargetModel)) -> TargetModel {
    let mut target = TargetModel::default();
    edit(&mut target);
    target
}

#[rstest]
#[case::no_pipes(broken(|t| t.pipes.clear()))]
#[case::zero_latency(broken(|t| t.pipes[1] = PipeModel::new("float", 0)))]
#[case::too_many_tokens(broken(|t| t.token_count = 33))]
#[case::token_only_without_tokens(broken(|t| {
    t.encode_mode = EncodeMode::TokenOnly;
    t.token_count = 0;
}))]
#[case::zero_max_distance(broken(|t| t.max_distance = 0))]
#[case::empty_grf(broken(|t| t.register_file.grf_count = 0))]
#[case::zero_sized_flags(broken(|t| t.register_file.flag_bytes = 0))]
#[case::huge_grf(broken(|t| t.register_file.grf_count = u32::MAX))]
#[case::bucket_count_overflows(broken(|t| {
    t.register_file.grf_count = u32::MAX - 4;
    t.register_file.acc_count = 8;
}))]
#[case::one_bucket_too_many(broken(|t| t.register_file.grf_count = MAX_BUCKETS - 10))]
fn test_invalid_target(#[case] target: TargetModel) {
    assert!(matches!(target.validate(), Err(SwsbError::InvalidTarget(_))));
    let err = pass::analyze(&kernel(vec![alu(1, &[2])]), &target).unwrap_err();
    assert!(matches!(err, SwsbError::InvalidTarget(_)));
}

#[test]
fn test_token_only_ignores_max_distance() {
    let target = TargetModel {
        encode_mode: EncodeMode::TokenOnly,
        max_distance: 0,
        ..TargetModel::default()
    };
    assert!(target.validate().is_ok());
}

#[test]
fn test_largest_register_file_is_accepted() {
    let mut target = TargetModel::default();
    target.register_file.grf_count = MAX_BUCKETS - 11;
    assert_eq!(target.total_buckets(), MAX_BUCKETS);
    let last = MAX_BUCKETS - 12;
    let k = kernel(vec![alu(last, &[1]), alu(2, &[last])]);
    let (plan, _) = pass::analyze(&k, &target).unwrap();
    assert_eq!(plan.blocks[0].insts[1].hazards.len(), 1);
}
