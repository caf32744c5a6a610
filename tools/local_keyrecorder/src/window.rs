//! Desktop host surface: a window with one multi-line edit control.
//!
//! Only key presses delivered to that edit control are reported; the edit
//! control is subclassed rather than hooking any global input.

use std::cell::{Cell, RefCell};
use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::panic::{self, AssertUnwindSafe};

use anyhow::{bail, Context, Result};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, RECT, TRUE, WPARAM};
use windows::Win32::Graphics::Gdi::{GetStockObject, DEFAULT_GUI_FONT, HBRUSH, WHITE_BRUSH};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::HiDpi::{SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2};
use windows::Win32::UI::Input::KeyboardAndMouse::{GetKeyboardLayout, GetKeyboardState, SetFocus, ToUnicodeEx};
use windows::Win32::UI::Shell::{DefSubclassProc, RemoveWindowSubclass, SetWindowSubclass};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DispatchMessageW, GetClientRect, GetMessageW, LoadCursorW, MoveWindow,
    PostQuitMessage, RegisterClassW, SendMessageW, ShowWindow, TranslateMessage, CW_USEDEFAULT, ES_AUTOVSCROLL,
    ES_MULTILINE, ES_WANTRETURN, HMENU, IDC_ARROW, MSG, SW_SHOW, WINDOW_EX_STYLE, WINDOW_STYLE, WM_DESTROY,
    WM_KEYDOWN, WM_NCDESTROY, WM_SETFONT, WM_SIZE, WM_SYSKEYDOWN, WNDCLASSW, WS_CHILD, WS_EX_CLIENTEDGE,
    WS_OVERLAPPEDWINDOW, WS_VISIBLE, WS_VSCROLL,
};

use crate::capture::{KeyHandler, KeySurface};
use crate::config::RecorderConfig;
use crate::keysym::keysym_for_virtual_key;
use crate::record::KeyEvent;

const CLASS_NAME: &str = "LocalKeyRecorderWindow";
const EDIT_ID: isize = 100;
const EDIT_SUBCLASS_ID: usize = 1;
const MARGIN: i32 = 10;
const LABEL_HEIGHT: i32 = 40;
// Leaves the keyboard state (dead keys) untouched; Windows 10 1607+.
const TO_UNICODE_NO_STATE_CHANGE: u32 = 0x4;

const INFO_TEXT: &str = "Recording starts automatically.\r\n\
                         Click in the area below and type: only keys pressed there are recorded.";
const PLACEHOLDER_TEXT: &str = "Click here, then type. The log is updated and printed to the console.\r\n";

thread_local! {
    static KEY_HANDLER: RefCell<Option<KeyHandler>> = RefCell::new(None);
    static CHILDREN: Cell<Option<(HWND, HWND)>> = Cell::new(None);
}

pub struct TextEntryWindow {
    hwnd: HWND,
    edit: HWND,
    subclassed: bool,
}

impl TextEntryWindow {
    pub fn create(config: &RecorderConfig) -> Result<Self> {
        unsafe {
            let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);

            let class_name = to_wide(CLASS_NAME);
            let hinstance = GetModuleHandleW(None).context("Failed to get module handle")?;
            let wc = WNDCLASSW {
                lpfnWndProc: Some(window_proc),
                hInstance: hinstance.into(),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                hbrBackground: HBRUSH(GetStockObject(WHITE_BRUSH).0),
                hCursor: LoadCursorW(None, IDC_ARROW).context("Failed to load cursor")?,
                ..Default::default()
            };
            if RegisterClassW(&wc) == 0 {
                bail!("Failed to register window class");
            }

            let title = to_wide(&config.window_title);
            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title.as_ptr()),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                config.width,
                config.height,
                HWND(0),
                HMENU(0),
                hinstance,
                None,
            );
            if hwnd.0 == 0 {
                bail!("Failed to create recorder window");
            }

            let info = to_wide(INFO_TEXT);
            let label = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                w!("STATIC"),
                PCWSTR(info.as_ptr()),
                WS_CHILD | WS_VISIBLE,
                0,
                0,
                0,
                0,
                hwnd,
                HMENU(0),
                hinstance,
                None,
            );
            let placeholder = to_wide(PLACEHOLDER_TEXT);
            let edit_style = WS_CHILD
                | WS_VISIBLE
                | WS_VSCROLL
                | WINDOW_STYLE(ES_MULTILINE as u32 | ES_AUTOVSCROLL as u32 | ES_WANTRETURN as u32);
            let edit = CreateWindowExW(
                WS_EX_CLIENTEDGE,
                w!("EDIT"),
                PCWSTR(placeholder.as_ptr()),
                edit_style,
                0,
                0,
                0,
                0,
                hwnd,
                HMENU(EDIT_ID),
                hinstance,
                None,
            );
            if edit.0 == 0 {
                bail!("Failed to create text area");
            }

            let font = GetStockObject(DEFAULT_GUI_FONT);
            for child in [label, edit] {
                SendMessageW(child, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
            }
            CHILDREN.with(|cell| cell.set(Some((label, edit))));

            let mut rect = RECT::default();
            if GetClientRect(hwnd, &mut rect).is_ok() {
                layout_children(rect.right - rect.left, rect.bottom - rect.top);
            }

            Ok(Self {
                hwnd,
                edit,
                subclassed: false,
            })
        }
    }

    /// Shows the window and pumps messages until it is closed.
    pub fn run(&self) -> Result<()> {
        unsafe {
            ShowWindow(self.hwnd, SW_SHOW);
            let _ = SetFocus(self.edit);

            let mut msg = MSG::default();
            while GetMessageW(&mut msg, HWND(0), 0, 0).into() {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        Ok(())
    }
}

impl KeySurface for TextEntryWindow {
    fn on_key_event(&mut self, handler: KeyHandler) {
        KEY_HANDLER.with(|cell| *cell.borrow_mut() = Some(handler));
        if self.subclassed {
            return;
        }
        let installed =
            unsafe { SetWindowSubclass(self.edit, Some(edit_subclass_proc), EDIT_SUBCLASS_ID, 0) }.as_bool();
        if installed {
            self.subclassed = true;
        } else {
            eprintln!("Failed to attach key handler to the text area; keys will not be recorded.");
        }
    }
}

fn to_wide(value: &str) -> Vec<u16> {
    OsStr::new(value).encode_wide().chain(Some(0)).collect()
}

fn layout_children(width: i32, height: i32) {
    let Some((label, edit)) = CHILDREN.with(Cell::get) else {
        return;
    };
    let inner_width = (width - 2 * MARGIN).max(0);
    let edit_top = MARGIN + LABEL_HEIGHT;
    unsafe {
        let _ = MoveWindow(label, MARGIN, MARGIN, inner_width, LABEL_HEIGHT, TRUE);
        let _ = MoveWindow(edit, MARGIN, edit_top, inner_width, (height - edit_top - MARGIN).max(0), TRUE);
    }
}

fn key_event_from_message(wparam: WPARAM, lparam: LPARAM) -> KeyEvent {
    let vk = wparam.0 as u32;
    let scan_code = ((lparam.0 >> 16) & 0xff) as u32;
    let extended = (lparam.0 >> 24) & 1 == 1;
    let character = translate_vk_to_text(vk, scan_code);
    let keysym = keysym_for_virtual_key(vk, scan_code, extended, character.as_deref());
    KeyEvent { character, keysym }
}

fn translate_vk_to_text(vk: u32, scan_code: u32) -> Option<String> {
    unsafe {
        let mut key_state = [0u8; 256];
        if GetKeyboardState(&mut key_state).is_err() {
            return None;
        }
        let layout = GetKeyboardLayout(0);
        let mut buffer = [0u16; 8];
        let written = ToUnicodeEx(vk, scan_code, &key_state, &mut buffer, TO_UNICODE_NO_STATE_CHANGE, layout);
        if written <= 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buffer[..written as usize]))
    }
}

fn dispatch_key_event(event: KeyEvent) {
    KEY_HANDLER.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            return;
        };
        if let Some(handler) = slot.as_mut() {
            if panic::catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                eprintln!("Key handler panicked; event dropped.");
            }
        }
    });
}

#[allow(unsafe_op_in_unsafe_fn)]
unsafe extern "system" fn edit_subclass_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    _subclass_id: usize,
    _ref_data: usize,
) -> LRESULT {
    match msg {
        WM_KEYDOWN | WM_SYSKEYDOWN => dispatch_key_event(key_event_from_message(wparam, lparam)),
        WM_NCDESTROY => {
            let _ = RemoveWindowSubclass(hwnd, Some(edit_subclass_proc), EDIT_SUBCLASS_ID);
        }
        _ => {}
    }
    DefSubclassProc(hwnd, msg, wparam, lparam)
}

#[allow(unsafe_op_in_unsafe_fn)]
unsafe extern "system" fn window_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_SIZE => {
            let width = (lparam.0 & 0xffff) as i32;
            let height = ((lparam.0 >> 16) & 0xffff) as i32;
            layout_children(width, height);
            LRESULT(0)
        }
        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
