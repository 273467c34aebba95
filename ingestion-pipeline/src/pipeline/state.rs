use state_machines::state_machine;

state_machine! {
    name: IngestionMachine,
    state: IngestionState,
    initial: Ready,
    states: [Ready, Validated, TextExtracted, Chunked, Generated, Failed],
    events {
        validate { transition: { from: Ready, to: Validated } }
        extract { transition: { from: Validated, to: TextExtracted } }
        chunk { transition: { from: TextExtracted, to: Chunked } }
        generate { transition: { from: Chunked, to: Generated } }
        abort {
            transition: { from: Ready, to: Failed }
            transition: { from: Validated, to: Failed }
            transition: { from: TextExtracted, to: Failed }
            transition: { from: Chunked, to: Failed }
            transition: { from: Generated, to: Failed }
        }
    }
}

pub fn ready() -> IngestionMachine<(), Ready> {
    IngestionMachine::new(())
}
