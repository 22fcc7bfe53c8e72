// Integration tests harness
mod transform {
    include!("transform.rs");
}
mod coroutines {
    include!("coroutines.rs");
}
mod control_flow {
    include!("control_flow.rs");
}
mod exceptions {
    include!("exceptions.rs");
}
mod loops {
    include!("loops.rs");
}
mod scope {
    include!("scope.rs");
}
mod context {
    include!("context.rs");
}
mod flavors {
    include!("flavors.rs");
}
mod core {
    include!("core.rs");
}
