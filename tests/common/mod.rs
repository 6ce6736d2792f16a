#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use disksize::notify::{Notice, Notifier};
use disksize::vbox::{Driver, DriverError, ExecOptions};

pub const MACHINE: &str = "devbox";

struct Medium {
    uuid: String,
    capacity_mb: u64,
    is_disk: bool,
}

#[derive(Default)]
struct State {
    vminfo: Vec<(String, String)>,
    media: HashMap<String, Medium>,
    calls: Vec<Vec<String>>,
    fail_on: Option<String>,
    inconclusive: Vec<String>,
    resize_padding_mb: u64,
    next_uuid: u32,
}

impl State {
    fn set(&mut self, key: &str, value: &str) {
        match self.vminfo.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.vminfo.push((key.to_string(), value.to_string())),
        }
    }

    fn new_uuid(&mut self) -> String {
        self.next_uuid += 1;
        format!("00000000-0000-0000-0000-{:012}", self.next_uuid)
    }

    fn uuid_to_medium(&self, uuid: &str) -> Option<&Medium> {
        self.media.values().find(|m| m.uuid == uuid)
    }
}

/// In-memory stand-in for `VBoxManage` that keeps the storage topology of a
/// single machine and records every call.
pub struct FakeVBox {
    dir: PathBuf,
    state: RefCell<State>,
}

fn failed(command: &str, stderr: &str) -> DriverError {
    DriverError::CommandFailed {
        command: command.to_string(),
        code: Some(1),
        stderr: stderr.to_string(),
    }
}

impl FakeVBox {
    pub fn new(dir: &Path) -> Self {
        let fake = Self {
            dir: dir.to_path_buf(),
            state: RefCell::new(State::default()),
        };
        {
            let mut state = fake.state.borrow_mut();
            state.set("name", MACHINE);
            state.set("storagecontrollername0", "SATA Controller");
            state.set("storagecontrollername1", "IDE Controller");
        }
        fake
    }

    pub fn path(&self, file: &str) -> String {
        self.dir.join(file).to_string_lossy().into_owned()
    }

    /// Attach a hard disk backed by a real file in the test directory.
    pub fn attach_disk(&self, slot: (&str, u32, u32), file: &str, capacity_mb: u64) -> String {
        let path = self.path(file);
        fs::write(&path, b"disk").expect("write backing file");
        self.attach_medium(slot, &path, capacity_mb, true)
    }

    pub fn attach_dvd(&self, slot: (&str, u32, u32), file: &str) -> String {
        let path = self.path(file);
        self.attach_medium(slot, &path, 0, false)
    }

    fn attach_medium(&self, slot: (&str, u32, u32), path: &str, capacity_mb: u64, is_disk: bool) -> String {
        let mut state = self.state.borrow_mut();
        let uuid = state.new_uuid();
        let (ctl, port, device) = slot;
        state.set(&format!("{ctl}-{port}-{device}"), path);
        state.set(&format!("{ctl}-ImageUUID-{port}-{device}"), &uuid);
        state.media.insert(
            path.to_string(),
            Medium {
                uuid: uuid.clone(),
                capacity_mb,
                is_disk,
            },
        );
        uuid
    }

    /// Make every call of `subcommand` fail.
    pub fn fail_on(&self, subcommand: &str) {
        self.state.borrow_mut().fail_on = Some(subcommand.to_string());
    }

    /// Make probing `uuid` fail with an unrelated error.
    pub fn inconclusive(&self, uuid: &str) {
        self.state.borrow_mut().inconclusive.push(uuid.to_string());
    }

    /// Make resizes land `extra_mb` above the requested size, the way
    /// VirtualBox rounds up to its allocation granularity.
    pub fn pad_resizes(&self, extra_mb: u64) {
        self.state.borrow_mut().resize_padding_mb = extra_mb;
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state.borrow().calls.clone()
    }

    pub fn subcommands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c[0].clone()).collect()
    }

    /// Subcommands that change VirtualBox state.
    pub fn mutations(&self) -> Vec<String> {
        const MUTATING: [&str; 7] = [
            "clonemedium",
            "clonehd",
            "storageattach",
            "closemedium",
            "modifymedium",
            "modifyhd",
            "startvm",
        ];
        self.subcommands()
            .into_iter()
            .filter(|s| MUTATING.contains(&s.as_str()))
            .collect()
    }

    pub fn capacity(&self, path: &str) -> Option<u64> {
        self.state.borrow().media.get(path).map(|m| m.capacity_mb)
    }

    fn show_vm_info(&self) -> String {
        self.state
            .borrow()
            .vminfo
            .iter()
            .map(|(k, v)| format!("\"{k}\"=\"{v}\"\n"))
            .collect()
    }

    fn show_medium_info(&self, command: &str, args: &[&str]) -> Result<String, DriverError> {
        let state = self.state.borrow();
        if args.first() == Some(&"disk") {
            let uuid = args[1];
            if state.inconclusive.iter().any(|u| u == uuid) {
                return Err(failed(command, "error: The object functionality is limited"));
            }
            return match state.uuid_to_medium(uuid) {
                Some(m) if m.is_disk => Ok(format!("UUID:           {uuid}\n")),
                _ => Err(failed(
                    command,
                    &format!(
                        "VBoxManage: error: Could not find file for the medium '{uuid}' (VERR_FILE_NOT_FOUND)\nVBoxManage: error: Details: code VBOX_E_OBJECT_NOT_FOUND"
                    ),
                )),
            };
        }
        let path = args[0];
        let medium = state
            .media
            .get(path)
            .ok_or_else(|| failed(command, "VBOX_E_OBJECT_NOT_FOUND"))?;
        Ok(format!(
            "UUID:           {}\nLocation:       {}\nStorage format: VDI\nCapacity:       {} MBytes\nSize on disk:   2 MBytes\n",
            medium.uuid, path, medium.capacity_mb
        ))
    }

    fn clone_medium(&self, command: &str, args: &[&str]) -> Result<String, DriverError> {
        let (src, dst) = (args[0], args[1]);
        assert_eq!(&args[2..], &["--format", "VDI"]);
        let mut state = self.state.borrow_mut();
        let capacity_mb = state
            .media
            .get(src)
            .map(|m| m.capacity_mb)
            .ok_or_else(|| failed(command, "VBOX_E_OBJECT_NOT_FOUND"))?;
        let uuid = state.new_uuid();
        fs::write(dst, b"clone").expect("write clone");
        state.media.insert(
            dst.to_string(),
            Medium {
                uuid: uuid.clone(),
                capacity_mb,
                is_disk: true,
            },
        );
        Ok(format!("Clone medium created in format 'VDI'. UUID: {uuid}\n"))
    }

    fn storage_attach(&self, command: &str, args: &[&str]) -> Result<String, DriverError> {
        assert_eq!(args[0], MACHINE);
        let flags: HashMap<&str, &str> = args[1..]
            .chunks(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();
        assert_eq!(flags["--type"], "hdd");
        let mut state = self.state.borrow_mut();
        let path = flags["--medium"];
        let uuid = state
            .media
            .get(path)
            .map(|m| m.uuid.clone())
            .ok_or_else(|| failed(command, "VBOX_E_OBJECT_NOT_FOUND"))?;
        let (ctl, port, device) = (flags["--storagectl"], flags["--port"], flags["--device"]);
        state.set(&format!("{ctl}-{port}-{device}"), path);
        state.set(&format!("{ctl}-ImageUUID-{port}-{device}"), &uuid);
        Ok(String::new())
    }

    fn close_medium(&self, command: &str, args: &[&str]) -> Result<String, DriverError> {
        assert_eq!(args[1], "--delete");
        let mut state = self.state.borrow_mut();
        state
            .media
            .remove(args[0])
            .ok_or_else(|| failed(command, "VBOX_E_OBJECT_NOT_FOUND"))?;
        let _ = fs::remove_file(args[0]);
        Ok(String::new())
    }

    fn modify_medium(&self, command: &str, args: &[&str]) -> Result<String, DriverError> {
        assert_eq!(args[1], "--resize");
        let size: u64 = args[2].parse().expect("numeric size");
        let mut state = self.state.borrow_mut();
        let padding = state.resize_padding_mb;
        let medium = state
            .media
            .get_mut(args[0])
            .ok_or_else(|| failed(command, "VBOX_E_OBJECT_NOT_FOUND"))?;
        medium.capacity_mb = size + padding;
        Ok(String::new())
    }
}

impl Driver for FakeVBox {
    fn execute(
        &self,
        subcommand: &str,
        args: &[&str],
        _options: ExecOptions,
    ) -> Result<String, DriverError> {
        {
            let mut state = self.state.borrow_mut();
            let mut call = vec![subcommand.to_string()];
            call.extend(args.iter().map(|a| a.to_string()));
            state.calls.push(call);
            if state.fail_on.as_deref() == Some(subcommand) {
                return Err(failed(subcommand, "VBoxManage: error: simulated failure"));
            }
        }

        match subcommand {
            "showvminfo" => {
                assert_eq!(args, &[MACHINE, "--machinereadable"]);
                Ok(self.show_vm_info())
            }
            "showmediuminfo" | "showhdinfo" => self.show_medium_info(subcommand, args),
            "clonemedium" | "clonehd" => self.clone_medium(subcommand, args),
            "storageattach" => self.storage_attach(subcommand, args),
            "closemedium" => self.close_medium(subcommand, args),
            "modifymedium" | "modifyhd" => self.modify_medium(subcommand, args),
            "startvm" => Ok(format!("VM \"{}\" has been successfully started.\n", args[0])),
            other => panic!("unexpected VBoxManage subcommand {other}"),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.borrow_mut().push(notice.clone());
    }
}
