//! The gate library understood by the JKU simulator.
//!
//! The simulator resolves `include "qelib1.inc";` against its working
//! directory, so [`QELIB1`] is written next to every invocation. The lowerer
//! only accepts the builtins `U` and `CX` plus the gates defined here.

use qjku_hal::GateSet;

/// Contents of `qelib1.inc` as shipped to the engine.
pub const QELIB1: &str = "gate u3(theta,phi,lambda) q { U(theta,phi,lambda) q; }
gate u2(phi,lambda) q { U(pi/2,phi,lambda) q; }
gate u1(lambda) q { U(0,0,lambda) q; }
gate cx c,t { CX c,t; }
gate id a { U(0,0,0) a; }
gate u0(gamma) q { U(0,0,0) q; }
gate x a { u3(pi,0,pi) a; }
gate y a { u3(pi,pi/2,pi/2) a; }
gate z a { u1(pi) a; }
gate h a { u2(0,pi) a; }
gate s a { u1(pi/2) a; }
gate sdg a { u1(-pi/2) a; }
gate t a { u1(pi/4) a; }
gate tdg a { u1(-pi/4) a; }
gate rx(theta) a { u3(theta, -pi/2,pi/2) a; }
gate ry(theta) a { u3(theta,0,0) a; }
gate rz(phi) a { u1(phi) a; }
gate cz a,b { h b; cx a,b; h b; }
gate cy a,b { sdg b; cx a,b; s b; }
gate swap a,b { cx a,b; cx b,a; cx a,b; }
gate ch a,b {h b; sdg b; cx a,b; h b; t b; cx a,b; t b; h b; s b; x b; s a;}
gate ccx a,b,c {h c; cx b,c; tdg c; cx a,c; t c; cx b,c; tdg c; cx a,c; t b; t c; h c; cx a,b; t a; tdg b; cx a,b;}
gate cswap a,b,c {cx c,b; ccx a,b,c; cx c,b;}
gate crz(lambda) a,b {u1(lambda/2) b; cx a,b; u1(-lambda/2) b; cx a,b;}
gate cu1(lambda) a,b {u1(lambda/2) a; cx a,b; u1(-lambda/2) b; cx a,b; u1(lambda/2) b;}
gate cu3(theta,phi,lambda) c,t {u1((lambda-phi)/2) t; cx c,t; u3(-theta/2,0,-(phi+lambda)/2) t; cx c,t; u3(theta/2,phi,0) t;}
gate rzz(theta) a,b {cx a,b; u1(theta) b; cx a,b;}
";

/// File name the lowered program includes.
pub const QELIB1_FILE: &str = "qelib1.inc";

/// Signature of a library gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSpec {
    pub name: &'static str,
    pub num_params: usize,
    pub num_qubits: usize,
}

const fn spec(name: &'static str, num_params: usize, num_qubits: usize) -> GateSpec {
    GateSpec {
        name,
        num_params,
        num_qubits,
    }
}

/// Every gate the engine accepts, builtins first.
pub const GATES: &[GateSpec] = &[
    spec("U", 3, 1),
    spec("CX", 0, 2),
    spec("u3", 3, 1),
    spec("u2", 2, 1),
    spec("u1", 1, 1),
    spec("cx", 0, 2),
    spec("id", 0, 1),
    spec("u0", 1, 1),
    spec("x", 0, 1),
    spec("y", 0, 1),
    spec("z", 0, 1),
    spec("h", 0, 1),
    spec("s", 0, 1),
    spec("sdg", 0, 1),
    spec("t", 0, 1),
    spec("tdg", 0, 1),
    spec("rx", 1, 1),
    spec("ry", 1, 1),
    spec("rz", 1, 1),
    spec("cz", 0, 2),
    spec("cy", 0, 2),
    spec("swap", 0, 2),
    spec("ch", 0, 2),
    spec("ccx", 0, 3),
    spec("cswap", 0, 3),
    spec("crz", 1, 2),
    spec("cu1", 1, 2),
    spec("cu3", 3, 2),
    spec("rzz", 1, 2),
];

/// Look up a gate by name.
pub fn lookup(name: &str) -> Option<&'static GateSpec> {
    GATES.iter().find(|g| g.name == name)
}

/// The library as a HAL gate set.
pub fn gate_set() -> GateSet {
    GateSet::from_arities(GATES.iter().map(|g| (g.name, g.num_qubits)))
}
