pub(crate) mod session_gate;
