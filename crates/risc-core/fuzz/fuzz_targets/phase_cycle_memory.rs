#![no_main]

use libfuzzer_sys::fuzz_target;
use risc_core::{
    disassemble_range, Board, CentralProcessingUnit, ControlSignal, InterpreterSettings, Phase,
};

const RAM: u32 = 0x200;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let (head, image) = data.split_at(4);
    let key = head[0];
    let addr = u16::from_le_bytes([head[1], head[2]]);
    let width = head[3] & 1 == 1;

    let settings = InterpreterSettings {
        ram_size: RAM,
        ..InterpreterSettings::default()
    }
    .normalized();
    let mut board = Board::new(RAM as usize);
    let image = &image[..image.len().min(RAM as usize)];
    if board.memory.write_image(image).is_err() {
        return;
    }
    board.iod.input(key);

    let _ = disassemble_range(0, RAM as u16, board.memory.cells());

    let mut cpu = CentralProcessingUnit::new(&settings);
    for _ in 0..4_096 {
        match cpu.phase_next() {
            Phase::Fetch => cpu.fetch_instruction(&mut board),
            Phase::Decode => cpu.decode_instruction(&mut board),
            Phase::OperandFetch => cpu.fetch_operand(&mut board),
            Phase::Execute => cpu.execute_instruction(&mut board),
            Phase::Halted | Phase::Fault => break,
        }
    }

    board.bus.issue(addr, 0xA5A5, ControlSignal::memory_read(width));
    board.memory.operate(&mut board.bus);
    board.iod.operate(&mut board.bus);
    assert_eq!(board.memory.size(), RAM as usize);
});
