use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use graphrt::ops::op_key;
use graphrt::{
    Argument, DataType, DeviceType, ExecutionMode, HostDevice, OpConstructContext, OpContext,
    OpError, OpRegistry, OpResult, Operation, OperationBase, OperatorDef, Workspace,
};

struct NoopOp {
    base: OperationBase,
}

impl Operation for NoopOp {
    fn base(&self) -> &OperationBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OperationBase {
        &mut self.base
    }

    fn run(&mut self, _context: &OpContext<'_>) -> OpResult<()> {
        Ok(())
    }
}

fn counting_factory(
    calls: Arc<AtomicUsize>,
) -> impl Fn(&OpConstructContext<'_>) -> OpResult<NoopOp> + Send + Sync + 'static {
    move |context: &OpConstructContext<'_>| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(NoopOp {
            base: OperationBase::new(context)?,
        })
    }
}

fn noop(context: &OpConstructContext<'_>) -> OpResult<NoopOp> {
    Ok(NoopOp {
        base: OperationBase::new(context)?,
    })
}

#[test]
fn duplicate_registration_is_rejected() -> Result<()> {
    let mut registry = OpRegistry::new();
    registry.register_op("Conv", DeviceType::Cpu, DataType::F32, noop)?;

    let err = registry
        .register_op("Conv", DeviceType::Cpu, DataType::F32, noop)
        .unwrap_err();
    match err {
        OpError::DuplicateRegistration { key } => {
            assert_eq!(key, op_key("Conv", DeviceType::Cpu, DataType::F32))
        }
        other => panic!("unexpected error: {other}"),
    }

    // Same kind on another type is a distinct variant.
    registry.register_op("Conv", DeviceType::Cpu, DataType::I8, noop)?;
    Ok(())
}

#[test]
fn available_devices_reports_every_registered_device() -> Result<()> {
    let mut registry = OpRegistry::new();
    registry.register_op("Conv", DeviceType::Cpu, DataType::F32, noop)?;
    registry.register_op("Conv", DeviceType::Gpu, DataType::F32, noop)?;
    registry.register_op("Conv", DeviceType::Gpu, DataType::F16, noop)?;
    registry.register_op("Softmax", DeviceType::Dsp, DataType::U8, noop)?;

    let devices = registry.available_devices("Conv")?;
    assert_eq!(
        devices,
        BTreeSet::from([DeviceType::Cpu, DeviceType::Gpu])
    );
    assert_eq!(registry.op_types(), vec!["Conv", "Softmax"]);
    assert!(registry.is_registered("Softmax"));
    Ok(())
}

#[test]
fn available_devices_of_unknown_kind_fails() {
    let registry = OpRegistry::new();
    let err = registry.available_devices("Conv").unwrap_err();
    assert!(matches!(err, OpError::UnregisteredOp { ref op_type } if op_type == "Conv"));
}

#[test]
fn create_operation_uses_the_exact_variant() -> Result<()> {
    let f32_calls = Arc::new(AtomicUsize::new(0));
    let i8_calls = Arc::new(AtomicUsize::new(0));
    let mut registry = OpRegistry::new();
    registry.register_op(
        "Conv",
        DeviceType::Cpu,
        DataType::F32,
        counting_factory(Arc::clone(&f32_calls)),
    )?;
    registry.register_op(
        "Conv",
        DeviceType::Cpu,
        DataType::I8,
        counting_factory(Arc::clone(&i8_calls)),
    )?;

    let workspace = Workspace::new();
    let device = HostDevice::new();
    let def = OperatorDef::new("conv0", "Conv").with_arg(Argument::dtype(DataType::I8));
    let context = OpConstructContext::for_node(&def, &workspace, &device);

    let op = registry
        .create_operation(&context, DeviceType::Cpu, ExecutionMode::Normal)?
        .expect("normal-mode node should be constructed");
    assert_eq!(op.debug_def().name, "conv0");
    assert_eq!(i8_calls.load(Ordering::SeqCst), 1);
    assert_eq!(f32_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn missing_type_argument_selects_the_f32_variant() -> Result<()> {
    let f32_calls = Arc::new(AtomicUsize::new(0));
    let mut registry = OpRegistry::new();
    registry.register_op(
        "Relu",
        DeviceType::Gpu,
        DataType::F32,
        counting_factory(Arc::clone(&f32_calls)),
    )?;

    let workspace = Workspace::new();
    let device = HostDevice::new();
    let def = OperatorDef::new("relu", "Relu");
    let context = OpConstructContext::for_node(&def, &workspace, &device);
    let op = registry.create_operation(&context, DeviceType::Gpu, ExecutionMode::Normal)?;
    assert!(op.is_some());
    assert_eq!(f32_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn registered_kind_without_requested_variant_fails() -> Result<()> {
    let mut registry = OpRegistry::new();
    registry.register_op("Conv", DeviceType::Cpu, DataType::F32, noop)?;

    let workspace = Workspace::new();
    let device = HostDevice::new();

    let int8 = OperatorDef::new("conv0", "Conv").with_arg(Argument::dtype(DataType::I8));
    let context = OpConstructContext::for_node(&int8, &workspace, &device);
    let err = registry
        .create_operation(&context, DeviceType::Cpu, ExecutionMode::Normal)
        .err()
        .expect("int8 variant is not registered");
    assert!(
        matches!(err, OpError::UnregisteredKey { ref key } if *key == op_key("Conv", DeviceType::Cpu, DataType::I8))
    );

    let float = OperatorDef::new("conv1", "Conv");
    let context = OpConstructContext::for_node(&float, &workspace, &device);
    let err = registry
        .create_operation(&context, DeviceType::Gpu, ExecutionMode::Normal)
        .err()
        .expect("gpu variant is not registered");
    assert!(matches!(err, OpError::UnregisteredKey { .. }));
    Ok(())
}

#[test]
fn unknown_kind_fails_in_matching_mode() {
    let registry = OpRegistry::new();
    let workspace = Workspace::new();
    let device = HostDevice::new();
    let def = OperatorDef::new("mystery", "Mystery");
    let context = OpConstructContext::for_node(&def, &workspace, &device);
    let err = registry
        .create_operation(&context, DeviceType::Cpu, ExecutionMode::Normal)
        .err()
        .expect("unregistered kind");
    assert!(matches!(err, OpError::UnregisteredOp { .. }));
}

#[test]
fn other_mode_nodes_are_skipped_silently() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = OpRegistry::new();
    registry.register_op(
        "Quantize",
        DeviceType::Cpu,
        DataType::F32,
        counting_factory(Arc::clone(&calls)),
    )?;

    let workspace = Workspace::new();
    let device = HostDevice::new();
    let calibration = OperatorDef::new("q", "Quantize")
        .with_arg(Argument::int("mode", ExecutionMode::Calibration.tag()));
    let context = OpConstructContext::for_node(&calibration, &workspace, &device);

    let op = registry.create_operation(&context, DeviceType::Cpu, ExecutionMode::Normal)?;
    assert!(op.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let op = registry.create_operation(&context, DeviceType::Cpu, ExecutionMode::Calibration)?;
    assert!(op.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Mode filtering happens before any registry lookup.
    let unknown = OperatorDef::new("train_only", "NotRegistered")
        .with_arg(Argument::int("mode", ExecutionMode::Training.tag()));
    let context = OpConstructContext::for_node(&unknown, &workspace, &device);
    assert!(registry
        .create_operation(&context, DeviceType::Cpu, ExecutionMode::Normal)?
        .is_none());
    Ok(())
}

#[test]
fn other_mode_nodes_skip_before_argument_validation() -> Result<()> {
    let mut registry = OpRegistry::new();
    registry.register_op("Conv", DeviceType::Cpu, DataType::F32, noop)?;

    let workspace = Workspace::new();
    let device = HostDevice::new();
    let nodes = [
        OperatorDef::new("unknown_type", "Conv")
            .with_arg(Argument::int("mode", ExecutionMode::Calibration.tag()))
            .with_arg(Argument::int("T", 99)),
        OperatorDef::new("float_type", "Conv")
            .with_arg(Argument::int("mode", ExecutionMode::Training.tag()))
            .with_arg(Argument::float("T", 1.0)),
        OperatorDef::new("unknown_mode", "Conv").with_arg(Argument::int("mode", 7)),
        OperatorDef::new("string_mode", "Conv").with_arg(Argument::string("mode", "normal")),
    ];
    for node in &nodes {
        let context = OpConstructContext::for_node(node, &workspace, &device);
        let op = registry.create_operation(&context, DeviceType::Cpu, ExecutionMode::Normal)?;
        assert!(op.is_none(), "{} should be skipped", node.name);
    }
    Ok(())
}

#[test]
fn bad_type_tag_fails_once_mode_matches() {
    let mut registry = OpRegistry::new();
    registry
        .register_op("Conv", DeviceType::Cpu, DataType::F32, noop)
        .expect("first registration");

    let workspace = Workspace::new();
    let device = HostDevice::new();
    let node = OperatorDef::new("conv", "Conv")
        .with_arg(Argument::int("mode", ExecutionMode::Calibration.tag()))
        .with_arg(Argument::int("T", 99));
    let context = OpConstructContext::for_node(&node, &workspace, &device);
    let err = registry
        .create_operation(&context, DeviceType::Cpu, ExecutionMode::Calibration)
        .err()
        .expect("unknown type tag");
    assert!(matches!(err, OpError::InvalidArgument { ref name, .. } if name == "T"));
}

#[test]
fn registry_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OpRegistry>();
    assert_send_sync::<graphrt::OpRegistryHandle>();
}

#[test]
fn context_without_node_is_rejected() {
    let registry = OpRegistry::new();
    let workspace = Workspace::new();
    let context = OpConstructContext::new(&workspace);
    let err = registry
        .create_operation(&context, DeviceType::Cpu, ExecutionMode::Normal)
        .err()
        .expect("context has no node");
    assert!(matches!(err, OpError::IncompleteContext { .. }));
}

#[test]
fn retargeted_context_builds_each_node() -> Result<()> {
    let mut registry = OpRegistry::new();
    registry.register_op("Relu", DeviceType::Cpu, DataType::F32, noop)?;
    let registry = registry.into_handle();

    let workspace = Workspace::new();
    let device = HostDevice::new();
    let defs = [
        OperatorDef::new("a", "Relu"),
        OperatorDef::new("b", "Relu"),
    ];

    let mut context = OpConstructContext::new(&workspace);
    context.set_device(&device);
    let mut names = Vec::new();
    for def in &defs {
        context.set_operator_def(def);
        let op = registry
            .create_operation(&context, DeviceType::Cpu, ExecutionMode::Normal)?
            .expect("normal mode");
        names.push(op.debug_def().name.clone());
    }
    assert_eq!(names, vec!["a", "b"]);
    Ok(())
}
