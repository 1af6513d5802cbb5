#![no_main]

use libfuzzer_sys::fuzz_target;
use node_path::PathStack;
use node_path::error::Error;

fuzz_target!(|ops: Vec<u8>| {
    let stack = PathStack::with_capacity(4);
    let mut tokens = vec![];
    let mut pushed: Vec<u8> = vec![];
    for op in ops {
        match op % 4 {
            0 | 1 => {
                tokens.push(stack.push(op));
                pushed.push(op);
            }
            2 => {
                if let Some(token) = tokens.pop() {
                    stack.release(token).unwrap();
                    pushed.pop();
                }
            }
            _ => {
                // An out-of-order release is rejected and leaves the stack untouched, but
                // the token is gone, so its segment stays pushed for the rest of the run.
                if tokens.len() > 1 {
                    let token = tokens.remove(0);
                    assert!(matches!(
                        stack.release(token),
                        Err(Error::UnbalancedRelease { .. })
                    ));
                }
                let path: Vec<u8> = stack
                    .current_path()
                    .collect::<node_path::Result<_>>()
                    .unwrap();
                assert_eq!(path, pushed);
            }
        }
    }
});
