/// Buttons on the handheld.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    /// Bit in the pressed mask: d-pad in the low nibble, buttons in the
    /// high nibble, each in P1 bit order.
    fn mask(self) -> u8 {
        match self {
            Button::Right => 0x01,
            Button::Left => 0x02,
            Button::Up => 0x04,
            Button::Down => 0x08,
            Button::A => 0x10,
            Button::B => 0x20,
            Button::Select => 0x40,
            Button::Start => 0x80,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Joypad {
    /// P1 bits 5 (buttons) and 4 (d-pad); 0 selects the group.
    pub(crate) select: u8,
    /// Bit set means held down.
    pub(crate) pressed: u8,
}

impl Default for Joypad {
    fn default() -> Self {
        Self {
            select: 0x30,
            pressed: 0,
        }
    }
}

impl Joypad {
    pub(crate) fn read(&self) -> u8 {
        let select = self.select & 0x30;
        // A pressed button is observed as 0.
        let mut low = 0x0F;
        if select & 0x10 == 0 {
            low &= !self.pressed & 0x0F;
        }
        if select & 0x20 == 0 {
            low &= !(self.pressed >> 4) & 0x0F;
        }
        0xC0 | select | low
    }

    pub(crate) fn select(&mut self, value: u8) {
        self.select = value & 0x30;
    }

    /// Returns true when the button was not already held.
    pub(crate) fn press(&mut self, button: Button) -> bool {
        let newly = self.pressed & button.mask() == 0;
        self.pressed |= button.mask();
        newly
    }

    pub(crate) fn release(&mut self, button: Button) {
        self.pressed &= !button.mask();
    }
}
