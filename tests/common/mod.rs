//! A tiny Hack assembler and CPU for running translated programs in tests.
#![allow(dead_code)]

use std::collections::HashMap;

use vm2hack::Options;

pub const SP: usize = 0;
pub const LCL: usize = 1;
pub const ARG: usize = 2;
pub const THIS: usize = 3;
pub const THAT: usize = 4;
pub const STACK: i16 = 256;

const RAM_SIZE: usize = 32768;
const FIRST_VARIABLE: u16 = 16;

const COMPS: &[&str] = &[
    "0", "1", "-1", "D", "A", "M", "!D", "!A", "!M", "-D", "-A", "-M", "D+1", "A+1", "M+1",
    "D-1", "A-1", "M-1", "D+A", "D+M", "D-A", "D-M", "A-D", "M-D", "D&A", "D&M", "D|A", "D|M",
];
const DESTS: &[&str] = &["", "M", "D", "MD", "A", "AM", "AD", "AMD"];
const JUMPS: &[&str] = &["", "JGT", "JEQ", "JGE", "JLT", "JNE", "JLE", "JMP"];

#[derive(Debug, Clone)]
enum Instr {
    Load(u16),
    Compute {
        dest: String,
        comp: String,
        jump: String,
    },
}

fn predefined(sym: &str) -> Option<u16> {
    let addr = match sym {
        "SP" => 0,
        "LCL" => 1,
        "ARG" => 2,
        "THIS" => 3,
        "THAT" => 4,
        "SCREEN" => 16384,
        "KBD" => 24576,
        _ => {
            let reg: u16 = sym.strip_prefix('R')?.parse().ok()?;
            return (reg < 16).then_some(reg);
        }
    };
    Some(addr)
}

fn strip(line: &str) -> &str {
    line.split_once("//").map(|(s, _)| s).unwrap_or(line).trim()
}

pub struct Machine {
    pub ram: Vec<i16>,
    rom: Vec<Instr>,
    labels: HashMap<String, usize>,
    variables: HashMap<String, u16>,
    a: i16,
    d: i16,
    pc: usize,
}

impl Machine {
    /// Assemble `lines`, panicking on anything a Hack assembler would reject,
    /// including a label declared twice.
    pub fn load(lines: &[String]) -> Machine {
        let mut labels = HashMap::new();
        let mut count = 0;
        for line in lines.iter().map(|l| strip(l)) {
            if line.is_empty() {
                continue;
            }
            if let Some(label) = line.strip_prefix('(').and_then(|l| l.strip_suffix(')')) {
                let previous = labels.insert(label.to_string(), count);
                assert!(previous.is_none(), "label {label} declared twice");
            } else {
                count += 1;
            }
        }

        let mut variables = HashMap::new();
        let mut next_variable = FIRST_VARIABLE;
        let mut rom = Vec::with_capacity(count);
        for line in lines.iter().map(|l| strip(l)) {
            if line.is_empty() || line.starts_with('(') {
                continue;
            }
            if let Some(sym) = line.strip_prefix('@') {
                let addr = if let Ok(value) = sym.parse::<u16>() {
                    assert!(value < 0x8000, "constant {value} too large");
                    value
                } else if let Some(addr) = predefined(sym) {
                    addr
                } else if let Some(&addr) = labels.get(sym) {
                    addr as u16
                } else {
                    *variables.entry(sym.to_string()).or_insert_with(|| {
                        let addr = next_variable;
                        next_variable += 1;
                        addr
                    })
                };
                rom.push(Instr::Load(addr));
                continue;
            }

            let (rest, jump) = line.split_once(';').unwrap_or((line, ""));
            let (dest, comp) = rest.split_once('=').unwrap_or(("", rest));
            assert!(DESTS.contains(&dest), "bad dest in `{line}`");
            assert!(COMPS.contains(&comp), "bad comp in `{line}`");
            assert!(JUMPS.contains(&jump), "bad jump in `{line}`");
            rom.push(Instr::Compute {
                dest: dest.to_string(),
                comp: comp.to_string(),
                jump: jump.to_string(),
            });
        }

        Machine {
            ram: vec![0; RAM_SIZE],
            rom,
            labels,
            variables,
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    /// Address a variable symbol (such as a static) was allocated at.
    pub fn variable(&self, sym: &str) -> usize {
        self.variables[sym] as usize
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    fn m(&self) -> i16 {
        self.ram[self.a as u16 as usize]
    }

    fn compute(&self, comp: &str) -> i16 {
        let (d, a) = (self.d, self.a);
        match comp {
            "0" => 0,
            "1" => 1,
            "-1" => -1,
            "D" => d,
            "A" => a,
            "M" => self.m(),
            "!D" => !d,
            "!A" => !a,
            "!M" => !self.m(),
            "-D" => d.wrapping_neg(),
            "-A" => a.wrapping_neg(),
            "-M" => self.m().wrapping_neg(),
            "D+1" => d.wrapping_add(1),
            "A+1" => a.wrapping_add(1),
            "M+1" => self.m().wrapping_add(1),
            "D-1" => d.wrapping_sub(1),
            "A-1" => a.wrapping_sub(1),
            "M-1" => self.m().wrapping_sub(1),
            "D+A" => d.wrapping_add(a),
            "D+M" => d.wrapping_add(self.m()),
            "D-A" => d.wrapping_sub(a),
            "D-M" => d.wrapping_sub(self.m()),
            "A-D" => a.wrapping_sub(d),
            "M-D" => self.m().wrapping_sub(d),
            "D&A" => d & a,
            "D&M" => d & self.m(),
            "D|A" => d | a,
            "D|M" => d | self.m(),
            other => panic!("unknown comp {other}"),
        }
    }

    fn step(&mut self) {
        match self.rom[self.pc].clone() {
            Instr::Load(addr) => {
                self.a = addr as i16;
                self.pc += 1;
            }
            Instr::Compute { dest, comp, jump } => {
                let value = self.compute(&comp);
                let target = self.a as u16 as usize;
                if dest.contains('M') {
                    self.ram[target] = value;
                }
                if dest.contains('A') {
                    self.a = value;
                }
                if dest.contains('D') {
                    self.d = value;
                }
                let taken = match jump.as_str() {
                    "" => false,
                    "JGT" => value > 0,
                    "JEQ" => value == 0,
                    "JGE" => value >= 0,
                    "JLT" => value < 0,
                    "JNE" => value != 0,
                    "JLE" => value <= 0,
                    _ => true,
                };
                self.pc = if taken { target } else { self.pc + 1 };
            }
        }
    }

    /// Run until execution falls off the end of the program.
    pub fn run(&mut self, max_steps: usize) {
        let mut steps = 0;
        while self.pc < self.rom.len() {
            self.step();
            steps += 1;
            assert!(steps <= max_steps, "program did not finish");
        }
    }

    /// Run until the program counter reaches `label`.
    pub fn run_until(&mut self, label: &str, max_steps: usize) {
        let stop = self.labels[label];
        let mut steps = 0;
        while self.pc != stop {
            assert!(self.pc < self.rom.len(), "fell off the program before {label}");
            self.step();
            steps += 1;
            assert!(steps <= max_steps, "never reached {label}");
        }
    }

    pub fn sp(&self) -> i16 {
        self.ram[SP]
    }

    /// Stack contents from the base to SP, bottom first.
    pub fn stack(&self) -> &[i16] {
        &self.ram[STACK as usize..self.sp() as usize]
    }
}

/// Options for tests that inspect raw instruction lines.
pub fn plain() -> Options {
    Options {
        annotate: false,
        ..Options::default()
    }
}

pub fn translate(source: &str, options: Options) -> Vec<String> {
    vm2hack::translate_source("Test", source, options).expect("translation failed")
}

/// Assemble `source` with an empty stack at 256 and the segment pointers
/// set to distinct, unused regions.
pub fn machine(source: &str, options: Options) -> Machine {
    let mut machine = Machine::load(&translate(source, options));
    machine.ram[SP] = STACK;
    machine.ram[LCL] = 300;
    machine.ram[ARG] = 400;
    machine.ram[THIS] = 3000;
    machine.ram[THAT] = 3010;
    machine
}

/// Translate and run a straight-line program with default options.
pub fn execute(source: &str) -> Machine {
    let mut machine = machine(source, Options::default());
    machine.run(10_000);
    machine
}
